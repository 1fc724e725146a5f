//! Normalizer: raw source records to canonical articles
//!
//! One mapping function per raw record variant. Records without a title or
//! url are dropped and counted; optional fields that are missing or blank
//! become `None`.

use crate::article::{parse_timestamp, ApiArticle, Article, RawRecord, ScrapedHeadline};
use chrono::{DateTime, SubsecRound, Utc};

/// Source label used when NewsAPI does not name the outlet
const UNKNOWN_SOURCE: &str = "Unknown";

/// Title NewsAPI substitutes for withdrawn articles
const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Result of normalizing one source's records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub articles: Vec<Article>,
    /// Records dropped for lacking a title or url
    pub skipped: usize,
}

/// Current time at the precision articles are stored with
pub fn fetch_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Maps one raw record to an article
///
/// `source_label` is the label of the adapter that produced the record; API
/// records carry their own outlet name instead.
pub fn normalize(
    source_label: &str,
    record: RawRecord,
    fetched_at: DateTime<Utc>,
) -> Option<Article> {
    match record {
        RawRecord::Scraped(headline) => normalize_scraped(source_label, headline, fetched_at),
        RawRecord::Api(article) => normalize_api(article, fetched_at),
    }
}

/// Normalizes every record, counting the ones that had to be dropped
pub fn normalize_batch(
    source_label: &str,
    records: Vec<RawRecord>,
    fetched_at: DateTime<Utc>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for record in records {
        match normalize(source_label, record, fetched_at) {
            Some(article) => batch.articles.push(article),
            None => batch.skipped += 1,
        }
    }

    if batch.skipped > 0 {
        tracing::warn!(
            source = source_label,
            skipped = batch.skipped,
            "Dropped records without title or url"
        );
    }

    batch
}

fn normalize_scraped(
    source_label: &str,
    headline: ScrapedHeadline,
    fetched_at: DateTime<Utc>,
) -> Option<Article> {
    let title = optional(Some(headline.title))?;
    let url = optional(headline.link)?;

    Some(Article {
        title,
        source: source_label.to_string(),
        url,
        published_at: None,
        summary: optional(headline.description),
        fetched_at,
    })
}

fn normalize_api(article: ApiArticle, fetched_at: DateTime<Utc>) -> Option<Article> {
    let title = optional(article.title)?;
    if title == REMOVED_PLACEHOLDER {
        tracing::debug!(url = ?article.url, "Skipping removed NewsAPI entry");
        return None;
    }
    let url = optional(article.url)?;

    let source = article
        .source
        .and_then(|s| optional(s.name))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    Some(Article {
        title,
        source,
        url,
        published_at: article
            .published_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|ts| ts.trunc_subsecs(0)),
        summary: optional(article.description),
        fetched_at,
    })
}

/// Trimmed value, or None when missing or blank
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
