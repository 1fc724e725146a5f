//! Deduplication
//!
//! Two layers: within one fetch run, later records repeating an earlier url
//! or (case-insensitively) an earlier title are dropped; across runs, the
//! store's atomic insert-or-skip keeps urls unique for all history.

use crate::article::Article;
use crate::storage::{ArticleStore, InsertOutcome, StorageResult};
use std::collections::HashSet;

/// Tracks what one run has already admitted
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_urls: HashSet<String>,
    seen_titles: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time an article's url and title are seen
    pub fn admit(&mut self, article: &Article) -> bool {
        let title_key = article.title.trim().to_lowercase();

        if self.seen_urls.contains(&article.url) || self.seen_titles.contains(&title_key) {
            tracing::debug!(url = %article.url, "Dropping in-batch duplicate");
            return false;
        }

        self.seen_urls.insert(article.url.clone());
        self.seen_titles.insert(title_key);
        true
    }

    /// Keeps the first occurrence of each article, returning how many were dropped
    pub fn retain_unique(&mut self, articles: &mut Vec<Article>) -> usize {
        let before = articles.len();
        articles.retain(|article| self.admit(article));
        before - articles.len()
    }
}

/// Counts from writing a deduplicated batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub inserted: usize,
    pub already_stored: usize,
}

/// Inserts each article unless its url is already in the store
pub fn persist<S: ArticleStore + ?Sized>(
    store: &mut S,
    articles: &[Article],
) -> StorageResult<PersistSummary> {
    let mut summary = PersistSummary::default();

    for article in articles {
        match store.insert(article)? {
            InsertOutcome::Inserted => summary.inserted += 1,
            InsertOutcome::Skipped => {
                tracing::debug!(url = %article.url, "Already stored");
                summary.already_stored += 1;
            }
        }
    }

    Ok(summary)
}
