use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for sitecrawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl budget and parallelism
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in progress at once
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of distinct pages that may be claimed
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_pages: default_max_pages(),
        }
    }
}

/// HTTP fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Timeout for a single request attempt (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per page, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit; attempt `n` waits `n * backoff-base-ms` before retrying
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whether a non-HTML response is retried like a transient failure
    #[serde(rename = "retry-content-mismatch", default)]
    pub retry_content_mismatch: bool,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            user_agent: default_user_agent(),
            retry_content_mismatch: false,
        }
    }
}

/// Report and graph output
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the CSV report
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,

    /// Path of the DOT link graph; no graph is written when unset
    #[serde(rename = "graph-path", default)]
    pub graph_path: Option<String>,

    /// Words to look for in each page's title and excerpt
    #[serde(rename = "search-words", default)]
    pub search_words: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            graph_path: None,
            search_words: Vec::new(),
        }
    }
}

fn default_max_concurrency() -> usize {
    3
}

fn default_max_pages() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    "BootCrawler/1.0".to_string()
}

fn default_report_path() -> String {
    "report.csv".to_string()
}
