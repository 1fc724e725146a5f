//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore trait.

use crate::article::{format_timestamp, parse_timestamp, Article};
use crate::query::ArticleFilter;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, InsertOutcome, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;

const SELECT_ARTICLES: &str =
    "SELECT title, source, url, published_at, summary, fetched_at FROM articles WHERE 1=1";

const ORDER_NEWEST_FIRST: &str = " ORDER BY COALESCE(published_at, fetched_at) DESC, id DESC";

/// SQLite storage backend
///
/// Owns the connection for the lifetime of one command; dropping the value
/// closes the database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (creating if needed) the archive at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Closes the database, surfacing any error the close reports
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}

/// Article columns as stored, before timestamp parsing
struct ArticleRow {
    title: String,
    source: String,
    url: String,
    published_at: Option<String>,
    summary: Option<String>,
    fetched_at: String,
}

impl ArticleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            source: row.get(1)?,
            url: row.get(2)?,
            published_at: row.get(3)?,
            summary: row.get(4)?,
            fetched_at: row.get(5)?,
        })
    }

    fn into_article(self) -> StorageResult<Article> {
        let published_at = match self.published_at {
            Some(value) => Some(parse_timestamp(&value).ok_or(
                StorageError::CorruptTimestamp {
                    column: "published_at",
                    value,
                },
            )?),
            None => None,
        };

        let fetched_at =
            parse_timestamp(&self.fetched_at).ok_or_else(|| StorageError::CorruptTimestamp {
                column: "fetched_at",
                value: self.fetched_at.clone(),
            })?;

        Ok(Article {
            title: self.title,
            source: self.source,
            url: self.url,
            published_at,
            summary: self.summary,
            fetched_at,
        })
    }
}

impl ArticleStore for SqliteStorage {
    fn exists(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT id FROM articles WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&mut self, article: &Article) -> StorageResult<InsertOutcome> {
        if article.title.trim().is_empty() {
            return Err(StorageError::MissingField("title"));
        }
        if article.source.trim().is_empty() {
            return Err(StorageError::MissingField("source"));
        }
        if article.url.trim().is_empty() {
            return Err(StorageError::MissingField("url"));
        }

        // IMMEDIATE takes the write lock up front, so the lookup and the
        // write below cannot interleave with another writer.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM articles WHERE url = ?1",
                params![article.url],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            tx.commit()?;
            return Ok(InsertOutcome::Skipped);
        }

        tx.execute(
            "INSERT INTO articles (title, source, url, published_at, summary, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                article.title,
                article.source,
                article.url,
                article.published_at.as_ref().map(format_timestamp),
                article.summary,
                format_timestamp(&article.fetched_at),
            ],
        )?;
        tx.commit()?;

        Ok(InsertOutcome::Inserted)
    }

    fn scan(&self, filter: &ArticleFilter) -> StorageResult<Vec<Article>> {
        let mut sql = String::from(SELECT_ARTICLES);
        let mut values: Vec<String> = Vec::new();

        if let Some(source) = filter.source() {
            sql.push_str(" AND LOWER(source) = LOWER(?)");
            values.push(source.to_string());
        }

        if let Some(keyword) = filter.keyword() {
            sql.push_str(
                " AND (instr(LOWER(title), LOWER(?)) > 0
                  OR instr(LOWER(COALESCE(summary, '')), LOWER(?)) > 0)",
            );
            values.push(keyword.to_string());
            values.push(keyword.to_string());
        }

        if let Some(date) = filter.date() {
            sql.push_str(" AND substr(COALESCE(published_at, fetched_at), 1, 10) = ?");
            values.push(date.format("%Y-%m-%d").to_string());
        }

        sql.push_str(ORDER_NEWEST_FIRST);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), ArticleRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ArticleRow::into_article).collect()
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, COUNT(*) AS count FROM articles
             GROUP BY source ORDER BY count DESC, source ASC",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn effective_date_range(&self) -> StorageResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        // Stored timestamps share one fixed-width format, so text order is time order
        let (oldest, newest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(COALESCE(published_at, fetched_at)),
                    MAX(COALESCE(published_at, fetched_at))
             FROM articles",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        match (oldest, newest) {
            (Some(oldest), Some(newest)) => Ok(Some((
                parse_effective(oldest)?,
                parse_effective(newest)?,
            ))),
            _ => Ok(None),
        }
    }
}

fn parse_effective(value: String) -> StorageResult<DateTime<Utc>> {
    parse_timestamp(&value).ok_or(StorageError::CorruptTimestamp {
        column: "effective date",
        value,
    })
}
