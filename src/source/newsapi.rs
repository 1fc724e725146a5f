//! NewsAPI top-headlines adapter
//!
//! One GET against the configured endpoint with the key, language, page size
//! and optional keyword as query parameters.

use crate::article::{ApiArticle, RawRecord};
use crate::config::NewsApiConfig;
use crate::source::http::{send_with_retry, RetryPolicy};
use crate::source::SourceError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const SOURCE_NAME: &str = "NewsAPI";

/// Error codes NewsAPI uses for credential problems
const AUTH_ERROR_CODES: [&str; 4] = [
    "apiKeyMissing",
    "apiKeyInvalid",
    "apiKeyDisabled",
    "apiKeyExhausted",
];

/// Envelope of every NewsAPI response, success or error
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

/// Client for the NewsAPI top-headlines endpoint
#[derive(Debug, Clone)]
pub struct NewsApi {
    endpoint: String,
    api_key: String,
    language: String,
    page_size: u32,
    keyword: Option<String>,
    retry: RetryPolicy,
}

impl NewsApi {
    /// Builds the adapter, or None when no usable key is available
    ///
    /// A missing or blank key means the API source is switched off, not that
    /// anything went wrong.
    pub fn from_config(
        config: &NewsApiConfig,
        api_key: Option<&str>,
        keyword: Option<&str>,
        retry: RetryPolicy,
    ) -> Option<Self> {
        let api_key = api_key.map(str::trim).filter(|key| !key.is_empty())?;

        Some(Self {
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            language: config.language.clone(),
            page_size: config.page_size,
            keyword: keyword
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            retry,
        })
    }

    pub fn label(&self) -> &str {
        SOURCE_NAME
    }

    /// Requests the current top headlines
    pub async fn fetch(&self, client: &Client) -> Result<Vec<RawRecord>, SourceError> {
        tracing::info!(endpoint = %self.endpoint, keyword = ?self.keyword, "Fetching from NewsAPI");

        let page_size = self.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("apiKey", self.api_key.as_str()),
            ("language", self.language.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(keyword) = &self.keyword {
            params.push(("q", keyword.as_str()));
        }

        let request = client.get(&self.endpoint).query(&params);
        let response = send_with_retry(request, self.retry, SOURCE_NAME).await?;
        let status = response.status();

        let body = response.text().await.map_err(|e| SourceError::Fetch {
            origin: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        let articles = interpret_response(status, &body)?;
        tracing::info!(count = articles.len(), "NewsAPI returned articles");

        Ok(articles.into_iter().map(RawRecord::Api).collect())
    }
}

/// Maps an HTTP status and body onto articles or a classified error
fn interpret_response(status: StatusCode, body: &str) -> Result<Vec<ApiArticle>, SourceError> {
    let parsed: Result<ApiResponse, _> = serde_json::from_str(body);

    if status == StatusCode::UNAUTHORIZED {
        let message = parsed
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| "HTTP 401".to_string());
        return Err(SourceError::Auth {
            origin: SOURCE_NAME.to_string(),
            message,
        });
    }

    let response = match parsed {
        Ok(response) => response,
        Err(e) if status.is_success() => {
            return Err(SourceError::Parse {
                origin: SOURCE_NAME.to_string(),
                message: e.to_string(),
            });
        }
        Err(_) => {
            return Err(SourceError::Fetch {
                origin: SOURCE_NAME.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }
    };

    if response.status == "ok" {
        return Ok(response.articles);
    }

    let code = response.code.unwrap_or_default();
    let message = response
        .message
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    if AUTH_ERROR_CODES.contains(&code.as_str()) {
        Err(SourceError::Auth {
            origin: SOURCE_NAME.to_string(),
            message,
        })
    } else if code == "rateLimited" {
        Err(SourceError::RateLimit {
            origin: SOURCE_NAME.to_string(),
        })
    } else {
        Err(SourceError::Fetch {
            origin: SOURCE_NAME.to_string(),
            message: format!("{}: {}", code, message),
        })
    }
}
