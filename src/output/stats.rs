//! Crawl statistics
//!
//! Summarizes a finished crawl for the end-of-run printout.

use crate::crawler::VisitedSet;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages fetched and extracted
    pub pages_recorded: usize,

    /// Pages claimed but never recorded (fetch failed or cancelled)
    pub pages_unfetched: usize,

    /// Total same-site links across all records
    pub internal_links: usize,

    /// Total off-site links across all records
    pub external_links: usize,

    /// Total image URLs across all records
    pub images: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn from_visited(visited: &VisitedSet, elapsed: Duration) -> Self {
        let mut stats = Self {
            pages_recorded: 0,
            pages_unfetched: visited.pending().count(),
            internal_links: 0,
            external_links: 0,
            images: 0,
            elapsed,
        };

        for (_, page) in visited.records() {
            stats.pages_recorded += 1;
            stats.internal_links += page.internal_links.len();
            stats.external_links += page.external_links.len();
            stats.images += page.image_urls.len();
        }

        stats
    }

    /// Pages recorded per second of crawl time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_recorded as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");
    println!("Pages recorded:  {}", stats.pages_recorded);
    println!("Pages unfetched: {}", stats.pages_unfetched);
    println!("Internal links:  {}", stats.internal_links);
    println!("External links:  {}", stats.external_links);
    println!("Images:          {}", stats.images);
    println!(
        "Elapsed:         {:.2}s ({:.2} pages/sec)",
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second()
    );
}
