//! Export module for writing articles to files
//!
//! This module handles:
//! - Choosing a format from user input (json, csv, excel)
//! - Serializing articles to JSON and CSV (both readable back losslessly)
//! - Writing an Excel workbook for spreadsheet users

mod delimited;
mod json;
mod spreadsheet;

pub use delimited::{read_csv, write_csv};
pub use json::{read_json, write_json};
pub use spreadsheet::write_xlsx;

use crate::article::Article;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format '{0}' (expected json, csv or excel)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Excel,
}

impl ExportFormat {
    /// File extension used for default output names
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "excel",
        };
        f.write_str(name)
    }
}

/// Writes `articles` to `destination` in the given format
///
/// # Arguments
///
/// * `articles` - Articles to write, in output order
/// * `format` - Target format
/// * `destination` - File to create or overwrite
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(ExportError)` - Destination not writable or serialization failed
pub fn export(articles: &[Article], format: ExportFormat, destination: &Path) -> ExportResult<()> {
    match format {
        ExportFormat::Json => write_json(articles, destination)?,
        ExportFormat::Csv => write_csv(articles, destination)?,
        ExportFormat::Excel => write_xlsx(articles, destination)?,
    }

    tracing::info!(
        count = articles.len(),
        %format,
        path = %destination.display(),
        "Exported articles"
    );
    Ok(())
}

/// Timestamped file name in the working directory, e.g. `news_export_20250101_093000.csv`
pub fn default_output_path(format: ExportFormat, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "news_export_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}
