use crate::config::types::{Config, HttpConfig, NewsApiConfig, ScraperConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_http_config(&config.http)?;
    validate_scraper_config(&config.scraper)?;
    validate_newsapi_config(&config.newsapi)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "scraper label cannot be empty".to_string(),
        ));
    }

    if config.max_headlines < 1 {
        return Err(ConfigError::Validation(format!(
            "max_headlines must be >= 1, got {}",
            config.max_headlines
        )));
    }

    validate_http_url("listing-url", &config.listing_url)
}

fn validate_newsapi_config(config: &NewsApiConfig) -> Result<(), ConfigError> {
    if !(1..=100).contains(&config.page_size) {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    if config.language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "language cannot be empty".to_string(),
        ));
    }

    validate_http_url("endpoint", &config.endpoint)
}

/// Checks that a configured URL parses and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
