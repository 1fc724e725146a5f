//! Configuration module for News-Ledger
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every value has a default, so the tool runs without one.
//!
//! # Example
//!
//! ```no_run
//! use news_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("news-ledger.toml")).unwrap();
//! println!("Scraping: {}", config.scraper.listing_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, NewsApiConfig, ScraperConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
