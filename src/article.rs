//! Article model and the raw record shapes produced by each source
//!
//! `Article` is the only persisted entity. Raw records keep whatever the
//! source handed us until the normalizer maps them into an `Article`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Column names shared by the CSV and spreadsheet exporters
///
/// Must stay in the same order as the fields of [`Article`].
pub const ARTICLE_COLUMNS: [&str; 6] = [
    "title",
    "source",
    "url",
    "published_at",
    "summary",
    "fetched_at",
];

/// A normalized news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline text, trimmed and non-empty
    pub title: String,

    /// Origin label (e.g. "BBC News")
    pub source: String,

    /// Canonical link; the identity key of an article
    pub url: String,

    /// Publication time reported by the source, if any
    pub published_at: Option<DateTime<Utc>>,

    /// Short description or teaser
    pub summary: Option<String>,

    /// When this record was fetched and normalized
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    /// Publication time if known, otherwise the fetch time
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.fetched_at)
    }

    /// Calendar date of [`Article::effective_at`]
    pub fn effective_date(&self) -> NaiveDate {
        self.effective_at().date_naive()
    }
}

/// Formats a timestamp the way it is stored: second precision with a `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a timestamp in RFC 3339 form into UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A headline card pulled out of the scraped listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedHeadline {
    pub title: String,
    /// Absolute link, or None if the card had no usable anchor
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Source block nested inside a NewsAPI article
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of the NewsAPI `articles` array
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    #[serde(default)]
    pub source: Option<ApiSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw record as produced by a source adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Scraped(ScrapedHeadline),
    Api(ApiArticle),
}
