//! Output module for crawl reports
//!
//! This module handles:
//! - Writing the CSV report (one row per page)
//! - Matching search words against page text
//! - Building and rendering the internal link graph
//! - Summarizing crawl statistics

mod graph;
mod keywords;
mod report;
mod stats;

pub use graph::LinkGraph;
pub use keywords::keyword_matches;
pub use report::{render_csv_report, write_csv_report, REPORT_HEADER};
pub use stats::{print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
