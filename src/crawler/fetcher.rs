//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests with a per-attempt timeout
//! - Status and Content-Type validation
//! - Linear-backoff retries for transient failures

use crate::config::FetchConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a fetch attempt (or the whole fetch) failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error status code: {status}")]
    Status { status: u16 },

    #[error("invalid content type: {content_type}")]
    ContentMismatch { content_type: String },

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Retry behaviour for a single page
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP status >= 400 | Retry |
/// | Timeout | Retry |
/// | Connection or transport error | Retry |
/// | Content-Type not HTML | Retry only if `retry_content_mismatch` |
///
/// Attempt `n` that fails (before the last) waits `backoff_base * n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub retry_content_mismatch: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base: config.backoff_base(),
            retry_content_mismatch: config.retry_content_mismatch,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }

    pub fn is_retryable(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Status { .. } | FetchError::Timeout | FetchError::Transport(_) => true,
            FetchError::ContentMismatch { .. } => self.retry_content_mismatch,
            FetchError::Exhausted { .. } => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// One client is built per crawl and shared by every task, so connections are
/// pooled rather than opened per request.
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::FetchConfig;
/// use sitecrawl::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches HTML documents with retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            policy,
        }
    }

    pub fn from_config(client: Client, config: &FetchConfig) -> Self {
        Self::new(client, config.timeout(), RetryPolicy::from_config(config))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` and returns the document body
    ///
    /// Retryable failures are retried until `max_attempts` is reached, after
    /// which [`FetchError::Exhausted`] carries the last failure. A
    /// non-retryable failure is returned as is.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            let error = match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(error) => error,
            };

            if !self.policy.is_retryable(&error) {
                return Err(error);
            }

            if attempt >= self.policy.max_attempts {
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                attempt,
                self.policy.max_attempts,
                url,
                error,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One GET request with status and Content-Type checks
    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::ContentMismatch { content_type });
        }

        Ok(response.text().await?)
    }
}
