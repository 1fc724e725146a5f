//! Source adapters: turn one external origin into raw records
//!
//! Two interchangeable variants sit behind the [`Source`] enum:
//! - `ScrapedSite`: a news listing page parsed with CSS selectors
//! - `NewsApi`: the NewsAPI top-headlines endpoint
//!
//! Adapters only do network I/O; nothing here touches storage.

mod http;
mod newsapi;
mod scraped;

pub use http::{build_http_client, send_with_retry, RetryPolicy};
pub use newsapi::NewsApi;
pub use scraped::{parse_listing, ScrapedSite};

use crate::article::RawRecord;
use crate::config::Config;
use crate::ConfigError;
use reqwest::Client;
use thiserror::Error;

/// Errors raised by a single source during a fetch
///
/// The pipeline catches these per source; they never abort a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {origin} failed: {message}")]
    Fetch { origin: String, message: String },

    #[error("{origin} rejected the credentials: {message}")]
    Auth { origin: String, message: String },

    #[error("{origin} is throttling requests")]
    RateLimit { origin: String },

    #[error("unexpected response structure from {origin}: {message}")]
    Parse { origin: String, message: String },
}

/// One configured news origin
#[derive(Debug, Clone)]
pub enum Source {
    Scraped(ScrapedSite),
    Api(NewsApi),
}

impl Source {
    /// Name used in logs and fetch reports
    pub fn name(&self) -> &str {
        match self {
            Source::Scraped(s) => s.label(),
            Source::Api(s) => s.label(),
        }
    }

    pub async fn fetch(&self, client: &Client) -> Result<Vec<RawRecord>, SourceError> {
        match self {
            Source::Scraped(s) => s.fetch(client).await,
            Source::Api(s) => s.fetch(client).await,
        }
    }
}

/// Per-run options that come from the command line
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// NewsAPI key; absent or blank disables the API source
    pub api_key: Option<String>,
    /// Passed to NewsAPI as the `q` parameter
    pub keyword: Option<String>,
}

/// Builds the list of sources for one run, in fetch order
///
/// The scraped site comes first (when enabled); NewsAPI is only added when a
/// non-blank key is available from the options or the config file.
pub fn build_sources(config: &Config, options: &FetchOptions) -> Result<Vec<Source>, ConfigError> {
    let retry = RetryPolicy::from_config(&config.http);
    let mut sources = Vec::new();

    if config.scraper.enabled {
        sources.push(Source::Scraped(ScrapedSite::from_config(
            &config.scraper,
            retry,
        )?));
    }

    let api_key = options
        .api_key
        .as_deref()
        .or(config.newsapi.api_key.as_deref());

    match NewsApi::from_config(&config.newsapi, api_key, options.keyword.as_deref(), retry) {
        Some(api) => sources.push(Source::Api(api)),
        None => tracing::info!("No NewsAPI key supplied, skipping NewsAPI"),
    }

    Ok(sources)
}
