//! Archive statistics
//!
//! This module provides functionality for extracting and displaying
//! summary counts from the article store.

use crate::article::format_timestamp;
use crate::storage::{ArticleStore, StorageResult};
use chrono::{DateTime, Utc};

/// Archive statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStatistics {
    /// Total number of stored articles
    pub total_articles: u64,

    /// Article count per source label, largest first
    pub by_source: Vec<(String, u64)>,

    /// Effective date range covered by the archive
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ArchiveStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics<S: ArticleStore + ?Sized>(storage: &S) -> StorageResult<ArchiveStatistics> {
    let total_articles = storage.count_articles()?;
    let by_source = storage.count_by_source()?;

    let (oldest, newest) = storage.effective_date_range()?.unzip();

    Ok(ArchiveStatistics {
        total_articles,
        by_source,
        oldest,
        newest,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ArchiveStatistics) {
    println!("=== Archive Statistics ===\n");

    println!("Total articles: {}", stats.total_articles);
    if let (Some(oldest), Some(newest)) = (&stats.oldest, &stats.newest) {
        println!(
            "Date range: {} .. {}",
            format_timestamp(oldest),
            format_timestamp(newest)
        );
    }
    println!();

    if !stats.by_source.is_empty() {
        println!("Articles by Source:");
        for (source, count) in &stats.by_source {
            let percentage = if stats.total_articles > 0 {
                (*count as f64 / stats.total_articles as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", source, count, percentage);
        }
    }
}
