use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;

/// Upper bound on parallel fetches
pub const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Upper bound on attempts per page
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Upper bound on the number of search words
pub const MAX_SEARCH_WORDS: usize = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.max_concurrency
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_LIMIT, config.max_attempts
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.graph_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "graph_path cannot be empty when set".to_string(),
        ));
    }

    if config.search_words.len() > MAX_SEARCH_WORDS {
        return Err(ConfigError::Validation(format!(
            "at most {} search words are allowed, got {}",
            MAX_SEARCH_WORDS,
            config.search_words.len()
        )));
    }

    if config.search_words.iter().any(|w| w.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search words cannot be empty".to_string(),
        ));
    }

    Ok(())
}
