//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::article::Article;
use crate::query::ArticleFilter;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt timestamp in column {column}: {value}")]
    CorruptTimestamp { column: &'static str, value: String },

    #[error("Refusing to store article without {0}")]
    MissingField(&'static str),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a check-and-insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The article was new and has been written
    Inserted,
    /// An article with the same url was already stored; nothing was written
    Skipped,
}

/// Trait for article archive backends
///
/// The archive never holds two articles with the same url.
pub trait ArticleStore {
    /// Returns true if an article with this url is stored
    fn exists(&self, url: &str) -> StorageResult<bool>;

    /// Stores the article unless its url is already present
    ///
    /// The existence check and the write are one atomic operation;
    /// implementations must not let a concurrent writer slip in between.
    /// An existing row is never modified (first write wins).
    fn insert(&mut self, article: &Article) -> StorageResult<InsertOutcome>;

    /// Returns the articles matching every criterion of `filter`
    ///
    /// Ordered newest first by effective date (published, else fetched),
    /// ties broken by most recent insertion.
    fn scan(&self, filter: &ArticleFilter) -> StorageResult<Vec<Article>>;

    /// Total number of stored articles
    fn count_articles(&self) -> StorageResult<u64>;

    /// Article counts per source label, largest first
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Oldest and newest effective dates, or None for an empty archive
    fn effective_date_range(&self) -> StorageResult<Option<(DateTime<Utc>, DateTime<Utc>)>>;
}
