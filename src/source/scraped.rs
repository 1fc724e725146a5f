//! Scraped listing page adapter
//!
//! Pulls headline cards out of a news listing page (the BBC News front page by
//! default). The page layout is not a stable contract: when the expected
//! elements are missing the adapter reports `SourceError::Parse` and the
//! pipeline carries on with the remaining sources.

use crate::article::{RawRecord, ScrapedHeadline};
use crate::config::ScraperConfig;
use crate::source::http::{send_with_retry, RetryPolicy};
use crate::source::SourceError;
use crate::ConfigError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Headline element of a card
const HEADLINE_SELECTOR: &str = "h2[data-testid='card-headline']";

/// Teaser text inside the same card link
const DESCRIPTION_SELECTOR: &str = "[data-testid='card-description']";

/// A listing page scraped for headline cards
#[derive(Debug, Clone)]
pub struct ScrapedSite {
    label: String,
    listing_url: Url,
    max_headlines: usize,
    retry: RetryPolicy,
}

impl ScrapedSite {
    pub fn new(label: impl Into<String>, listing_url: Url, max_headlines: usize) -> Self {
        Self {
            label: label.into(),
            listing_url,
            max_headlines,
            retry: RetryPolicy::none(),
        }
    }

    pub fn from_config(config: &ScraperConfig, retry: RetryPolicy) -> Result<Self, ConfigError> {
        let listing_url = Url::parse(&config.listing_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid listing-url '{}': {}", config.listing_url, e))
        })?;
        Ok(Self::new(config.label.clone(), listing_url, config.max_headlines).with_retry(retry))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Downloads the listing page and extracts its headline cards
    pub async fn fetch(&self, client: &Client) -> Result<Vec<RawRecord>, SourceError> {
        tracing::info!(source = %self.label, url = %self.listing_url, "Fetching listing page");

        let request = client.get(self.listing_url.clone());
        let response = send_with_retry(request, self.retry, &self.label).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Fetch {
                origin: self.label.clone(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Fetch {
            origin: self.label.clone(),
            message: e.to_string(),
        })?;

        let headlines = parse_listing(&body, &self.listing_url, self.max_headlines).map_err(
            |message| SourceError::Parse {
                origin: self.label.clone(),
                message,
            },
        )?;

        tracing::info!(source = %self.label, count = headlines.len(), "Extracted headlines");
        Ok(headlines.into_iter().map(RawRecord::Scraped).collect())
    }
}

/// Extracts up to `limit` headline cards from a listing page
///
/// Each card's link is the closest enclosing `<a href>`, resolved against
/// `base_url`. Returns an error when the page contains no headline elements
/// at all, which usually means the layout changed.
///
/// # Example
///
/// ```
/// use news_ledger::source::parse_listing;
/// use url::Url;
///
/// let html = r#"<a href="/news/1"><h2 data-testid="card-headline">Hello</h2></a>"#;
/// let base = Url::parse("https://www.bbc.com/news").unwrap();
/// let cards = parse_listing(html, &base, 20).unwrap();
/// assert_eq!(cards[0].link.as_deref(), Some("https://www.bbc.com/news/1"));
/// ```
pub fn parse_listing(
    html: &str,
    base_url: &Url,
    limit: usize,
) -> Result<Vec<ScrapedHeadline>, String> {
    let document = Html::parse_document(html);

    let headline_selector = Selector::parse(HEADLINE_SELECTOR)
        .map_err(|e| format!("invalid selector {}: {:?}", HEADLINE_SELECTOR, e))?;
    let description_selector = Selector::parse(DESCRIPTION_SELECTOR)
        .map_err(|e| format!("invalid selector {}: {:?}", DESCRIPTION_SELECTOR, e))?;

    let elements: Vec<ElementRef> = document.select(&headline_selector).collect();
    if elements.is_empty() {
        return Err(format!("no elements matched {}", HEADLINE_SELECTOR));
    }

    let headlines = elements
        .into_iter()
        .take(limit)
        .map(|headline| {
            let anchor = closest_anchor(headline);

            let link = anchor
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| resolve_link(href, base_url));

            let description = anchor
                .and_then(|a| a.select(&description_selector).next())
                .map(element_text)
                .filter(|text| !text.is_empty());

            ScrapedHeadline {
                title: element_text(headline),
                link,
                description,
            }
        })
        .collect();

    Ok(headlines)
}

/// Nearest `<a>` ancestor of an element
fn closest_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
}

/// Text content with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
