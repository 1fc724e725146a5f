//! News-Ledger: a headline archive
//!
//! This crate fetches news headlines from a scraped listing page and the
//! NewsAPI service, deduplicates them, keeps them in a local SQLite table,
//! and supports filtered querying and export to JSON, CSV and Excel.

pub mod article;
pub mod config;
pub mod dedupe;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod query;
pub mod source;
pub mod stats;
pub mod storage;

use thiserror::Error;

/// Main error type for News-Ledger operations
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for News-Ledger operations
pub type Result<T> = std::result::Result<T, NewsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{Article, RawRecord};
pub use config::Config;
pub use export::ExportFormat;
pub use query::ArticleFilter;
pub use storage::{ArticleStore, InsertOutcome, SqliteStorage};
