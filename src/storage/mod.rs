//! Storage module for persisting articles
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Atomic insert-or-skip keyed by url
//! - Filtered scans for the query engine and exporter
//! - Per-source counts for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ArticleStore, InsertOutcome, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}
