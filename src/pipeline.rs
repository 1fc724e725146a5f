//! Fetch pipeline
//!
//! Runs every configured source one after another, normalizes what they
//! return, drops in-run duplicates and writes the rest through the store's
//! insert-or-skip. A failing source is logged and recorded in the report;
//! only storage failures abort the run.

use crate::config::Config;
use crate::dedupe::{persist, Deduplicator};
use crate::normalize::{fetch_timestamp, normalize_batch};
use crate::source::{build_http_client, build_sources, FetchOptions, Source, SourceError};
use crate::storage::ArticleStore;
use crate::NewsError;
use reqwest::Client;

/// What happened to one source during a run
#[derive(Debug)]
pub enum SourceOutcome {
    Fetched {
        /// Raw records returned by the source
        records: usize,
        /// Records dropped by the normalizer
        skipped: usize,
    },
    Failed(SourceError),
}

#[derive(Debug)]
pub struct SourceReport {
    pub name: String,
    pub outcome: SourceOutcome,
}

/// Summary of one fetch run
#[derive(Debug, Default)]
pub struct FetchReport {
    pub sources: Vec<SourceReport>,
    /// Articles that survived normalization
    pub normalized: usize,
    /// Records dropped for lacking a title or url
    pub skipped_invalid: usize,
    /// Articles dropped as repeats within this run
    pub batch_duplicates: usize,
    /// Articles written to the store
    pub inserted: usize,
    /// Articles whose url was already stored
    pub already_stored: usize,
}

impl FetchReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = (&str, &SourceError)> {
        self.sources.iter().filter_map(|report| match &report.outcome {
            SourceOutcome::Failed(error) => Some((report.name.as_str(), error)),
            SourceOutcome::Fetched { .. } => None,
        })
    }

    /// Raw records returned across all sources
    pub fn fetched(&self) -> usize {
        self.sources
            .iter()
            .map(|report| match report.outcome {
                SourceOutcome::Fetched { records, .. } => records,
                SourceOutcome::Failed(_) => 0,
            })
            .sum()
    }
}

/// Builds the sources from config and options, then runs them into `store`
///
/// # Arguments
///
/// * `config` - Loaded configuration
/// * `options` - API key and keyword from the command line
/// * `store` - Open article store
///
/// # Returns
///
/// * `Ok(FetchReport)` - Run finished, possibly with failed sources
/// * `Err(NewsError)` - Config, HTTP client or storage failure
pub async fn run_fetch<S: ArticleStore + ?Sized>(
    config: &Config,
    options: &FetchOptions,
    store: &mut S,
) -> Result<FetchReport, NewsError> {
    let sources = build_sources(config, options)?;
    let client = build_http_client(&config.http)?;
    fetch_into(&sources, &client, store).await
}

/// Runs the given sources sequentially and stores what they yield
pub async fn fetch_into<S: ArticleStore + ?Sized>(
    sources: &[Source],
    client: &Client,
    store: &mut S,
) -> Result<FetchReport, NewsError> {
    let mut report = FetchReport::default();
    let mut dedupe = Deduplicator::new();
    let mut articles = Vec::new();

    for source in sources {
        let name = source.name().to_string();

        match source.fetch(client).await {
            Ok(records) => {
                let count = records.len();
                let batch = normalize_batch(&name, records, fetch_timestamp());

                if count == 0 {
                    tracing::warn!(source = %name, "Source returned no articles");
                }

                report.normalized += batch.articles.len();
                report.skipped_invalid += batch.skipped;
                report.sources.push(SourceReport {
                    name,
                    outcome: SourceOutcome::Fetched {
                        records: count,
                        skipped: batch.skipped,
                    },
                });
                articles.extend(batch.articles);
            }
            Err(error) => {
                tracing::warn!(source = %name, "Source failed: {}", error);
                report.sources.push(SourceReport {
                    name,
                    outcome: SourceOutcome::Failed(error),
                });
            }
        }
    }

    report.batch_duplicates = dedupe.retain_unique(&mut articles);
    tracing::info!(unique = articles.len(), "Found unique articles");

    let summary = persist(store, &articles)?;
    report.inserted = summary.inserted;
    report.already_stored = summary.already_stored;

    tracing::info!(
        inserted = report.inserted,
        already_stored = report.already_stored,
        "Stored new articles"
    );

    Ok(report)
}
