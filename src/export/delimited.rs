//! CSV export
//!
//! The header row is always written, so an empty export is a header-only
//! file. Absent optional fields are empty cells and read back as `None`.

use crate::article::{Article, ARTICLE_COLUMNS};
use crate::export::ExportResult;
use std::fs::File;
use std::path::Path;

/// Writes articles as CSV with a header row
pub fn write_csv(articles: &[Article], path: &Path) -> ExportResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(ARTICLE_COLUMNS)?;
    for article in articles {
        writer.serialize(article)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads back a file produced by [`write_csv`]
pub fn read_csv(path: &Path) -> ExportResult<Vec<Article>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let articles = reader
        .deserialize()
        .collect::<Result<Vec<Article>, csv::Error>>()?;

    Ok(articles)
}
