//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML extraction of titles, excerpts, links, and images
//! - The visited registry that deduplicates pages and enforces the budget
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod registry;

pub use coordinator::Coordinator;
pub use extractor::{extract_page, HtmlExtractor, PageExtractor};
pub use fetcher::{build_http_client, FetchError, Fetcher, RetryPolicy};
pub use registry::{ClaimOutcome, InFlightGuard, PageRecord, TaskId, VisitedRegistry, VisitedSet};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl of one site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and seed URL
/// 2. Build the shared HTTP client
/// 3. Crawl every reachable same-site page within the page budget
/// 4. Return every claimed page with its record
///
/// # Arguments
///
/// * `seed` - The URL to start from; its host defines the site
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(VisitedSet)` - Crawl finished (possibly cut short by the budget)
/// * `Err(CrawlError)` - Invalid input, or the seed page could not be crawled
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::Config;
/// use sitecrawl::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let visited = crawl("https://example.com", &Config::default()).await?;
/// for (key, page) in visited.records() {
///     println!("{}: {}", key, page.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(seed: &str, config: &Config) -> Result<VisitedSet, CrawlError> {
    Coordinator::new(seed, config)?.run().await
}
