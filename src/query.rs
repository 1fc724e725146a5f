//! Query engine: filter criteria over the article archive
//!
//! Criteria combine with AND; an empty filter matches every article.
//! Results come back newest first (see [`ArticleStore::scan`]).

use crate::article::Article;
use crate::storage::{ArticleStore, StorageResult};
use chrono::NaiveDate;

/// Filter criteria for [`query`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    source: Option<String>,
    keyword: Option<String>,
    date: Option<NaiveDate>,
}

impl ArticleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact, case-insensitive match on the source label
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = non_blank(source.into());
        self
    }

    /// Case-insensitive substring match on title or summary
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = non_blank(keyword.into());
        self
    }

    /// Exact match on the calendar date of the effective timestamp
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Builds a filter from optional CLI values; blank strings count as absent
    pub fn from_parts(
        source: Option<String>,
        keyword: Option<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            source: source.and_then(non_blank),
            keyword: keyword.and_then(non_blank),
            date,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.keyword.is_none() && self.date.is_none()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Runs `filter` against the store
pub fn query<S: ArticleStore + ?Sized>(
    store: &S,
    filter: &ArticleFilter,
) -> StorageResult<Vec<Article>> {
    let articles = store.scan(filter)?;
    tracing::debug!(matches = articles.len(), ?filter, "Query finished");
    Ok(articles)
}
