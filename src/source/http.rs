//! HTTP plumbing shared by the source adapters
//!
//! This module handles:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Sending a request with bounded retries for transient failures
//! - Classifying transport errors and throttling into `SourceError`

use crate::config::HttpConfig;
use crate::source::SourceError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// How many times, and how far apart, transient failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// A policy that gives up after the first attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }
}

/// What a single attempt amounted to
enum Attempt {
    Done(Response),
    Transient(SourceError),
}

/// Sends `request`, retrying transport errors, 5xx and 429 responses
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Transport error / timeout | Retry, then `Fetch` |
/// | HTTP 5xx | Retry, then `Fetch` |
/// | HTTP 429 | Retry, then `RateLimit` |
/// | Anything else | Returned to the caller as-is |
///
/// # Arguments
///
/// * `request` - The request to send; must be cloneable (no streaming body)
/// * `policy` - Retry bounds
/// * `origin` - Source name used in errors and logs
pub async fn send_with_retry(
    request: RequestBuilder,
    policy: RetryPolicy,
    origin: &str,
) -> Result<Response, SourceError> {
    let mut attempt = 0;

    loop {
        let this_try = request.try_clone().ok_or_else(|| SourceError::Fetch {
            origin: origin.to_string(),
            message: "request cannot be retried".to_string(),
        })?;

        let error = match classify(this_try.send().await, origin) {
            Attempt::Done(response) => return Ok(response),
            Attempt::Transient(error) => error,
        };

        if attempt >= policy.max_retries {
            return Err(error);
        }

        attempt += 1;
        tracing::warn!(
            source = origin,
            attempt,
            max_retries = policy.max_retries,
            "Transient failure ({}), retrying",
            error
        );
        tokio::time::sleep(policy.delay).await;
    }
}

fn classify(result: Result<Response, reqwest::Error>, origin: &str) -> Attempt {
    match result {
        Ok(response) => {
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                Attempt::Transient(SourceError::RateLimit {
                    origin: origin.to_string(),
                })
            } else if status.is_server_error() {
                Attempt::Transient(SourceError::Fetch {
                    origin: origin.to_string(),
                    message: format!("HTTP {}", status.as_u16()),
                })
            } else {
                Attempt::Done(response)
            }
        }
        Err(e) => {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection refused".to_string()
            } else {
                e.to_string()
            };
            Attempt::Transient(SourceError::Fetch {
                origin: origin.to_string(),
                message,
            })
        }
    }
}
