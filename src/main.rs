//! News-Ledger main entry point
//!
//! This is the command-line interface for the News-Ledger headline archive.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use news_ledger::article::format_timestamp;
use news_ledger::config::{load_config_or_default, Config};
use news_ledger::export::{default_output_path, export, ExportFormat};
use news_ledger::pipeline::{run_fetch, FetchReport};
use news_ledger::query::{query, ArticleFilter};
use news_ledger::source::FetchOptions;
use news_ledger::stats::{load_statistics, print_statistics};
use news_ledger::storage::{open_storage, SqliteStorage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// News-Ledger: a headline archive
///
/// News-Ledger collects headlines from a news listing page and the NewsAPI
/// service, keeps each article once in a local SQLite file, and lets you
/// query and export what has been collected.
#[derive(Parser, Debug)]
#[command(name = "news-ledger")]
#[command(version)]
#[command(about = "Collect, query and export news headlines", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch headlines from all sources and store the new ones
    Fetch {
        /// NewsAPI key; without one only the scraped site is used
        #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Keyword passed to NewsAPI
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Show stored articles, newest first
    Query {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of articles to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Write stored articles to a file
    Export {
        /// Output format: json, csv or excel
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (default: news_export_<timestamp>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show archive statistics
    Stats,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Source label, case-insensitive exact match
    #[arg(long)]
    source: Option<String>,

    /// Substring of title or summary, case-insensitive
    #[arg(long)]
    keyword: Option<String>,

    /// Effective date (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_filter(self) -> ArticleFilter {
        ArticleFilter::from_parts(self.source, self.keyword, self.date)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let mut config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(database) = &cli.database {
        config.storage.database_path = database.display().to_string();
    }

    match cli.command {
        Command::Fetch { api_key, keyword } => {
            handle_fetch(&config, FetchOptions { api_key, keyword }).await
        }
        Command::Query { filter, limit } => handle_query(&config, filter.into_filter(), limit),
        Command::Export {
            format,
            output,
            filter,
        } => handle_export(&config, &format, output, filter.into_filter()),
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_ledger=info,warn"),
            1 => EnvFilter::new("news_ledger=debug,info"),
            2 => EnvFilter::new("news_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_archive(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.storage.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Handles `fetch`: runs every source and stores new articles
async fn handle_fetch(config: &Config, options: FetchOptions) -> anyhow::Result<()> {
    let mut storage = open_archive(config)?;

    tracing::info!("Fetching news articles...");
    let report = run_fetch(config, &options, &mut storage)
        .await
        .context("Fetch failed")?;

    storage.close().context("Failed to close database")?;
    print_fetch_report(&report);

    Ok(())
}

fn print_fetch_report(report: &FetchReport) {
    println!("=== Fetch Summary ===\n");
    println!("Fetched:            {}", report.fetched());
    println!("Invalid skipped:    {}", report.skipped_invalid);
    println!("Batch duplicates:   {}", report.batch_duplicates);
    println!("Inserted:           {}", report.inserted);
    println!("Already stored:     {}", report.already_stored);

    let failed: Vec<_> = report.failed_sources().collect();
    if failed.is_empty() {
        println!("Failed sources:     none");
    } else {
        println!("Failed sources:     {}", failed.len());
        for (name, error) in failed {
            println!("  - {}: {}", name, error);
        }
    }
}

/// Handles `query`: prints the newest matches up to `limit`
fn handle_query(config: &Config, filter: ArticleFilter, limit: usize) -> anyhow::Result<()> {
    let storage = open_archive(config)?;
    let articles = query(&storage, &filter).context("Query failed")?;

    println!("\nFound {} articles:\n", articles.len());

    for (i, article) in articles.iter().take(limit).enumerate() {
        println!("{}. [{}] {}", i + 1, article.source, article.title);
        println!("   Date: {}", format_timestamp(&article.effective_at()));
        println!("   URL: {}\n", article.url);
    }

    if articles.len() > limit {
        println!("... and {} more", articles.len() - limit);
    }

    Ok(())
}

/// Handles `export`: writes the filtered archive in the requested format
fn handle_export(
    config: &Config,
    format: &str,
    output: Option<PathBuf>,
    filter: ArticleFilter,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let destination = output.unwrap_or_else(|| default_output_path(format, Local::now()));

    let storage = open_archive(config)?;
    let articles = query(&storage, &filter).context("Query failed")?;

    export(&articles, format, &destination)
        .with_context(|| format!("Failed to export to {}", destination.display()))?;

    println!(
        "Exported {} articles to {}",
        articles.len(),
        destination.display()
    );

    Ok(())
}

/// Handles `stats`: shows totals from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_archive(config)?;
    let stats = load_statistics(&storage).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}
