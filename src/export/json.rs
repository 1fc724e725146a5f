//! JSON export: a pretty-printed array of article objects

use crate::article::Article;
use crate::export::ExportResult;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes articles as a JSON array
pub fn write_json(articles: &[Article], path: &Path) -> ExportResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, articles)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads back a file produced by [`write_json`]
pub fn read_json(path: &Path) -> ExportResult<Vec<Article>> {
    let file = File::open(path)?;
    let articles = serde_json::from_reader(BufReader::new(file))?;
    Ok(articles)
}
