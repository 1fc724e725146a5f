//! Excel export: one `Articles` worksheet with a bold header row

use crate::article::{format_timestamp, Article, ARTICLE_COLUMNS};
use crate::export::{ExportError, ExportResult};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;

const SHEET_NAME: &str = "Articles";

/// Writes articles to an .xlsx workbook
///
/// Timestamps are written as RFC 3339 text so they read the same as in the
/// other formats.
pub fn write_xlsx(articles: &[Article], path: &Path) -> ExportResult<()> {
    build_workbook(articles, path).map_err(|e| match e {
        XlsxError::IoError(io) => ExportError::Io(io),
        other => ExportError::Spreadsheet(other.to_string()),
    })
}

fn build_workbook(articles: &[Article], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in ARTICLE_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (index, article) in articles.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_string(row, 0, article.title.as_str())?;
        worksheet.write_string(row, 1, article.source.as_str())?;
        worksheet.write_string(row, 2, article.url.as_str())?;
        if let Some(published_at) = &article.published_at {
            worksheet.write_string(row, 3, format_timestamp(published_at))?;
        }
        if let Some(summary) = &article.summary {
            worksheet.write_string(row, 4, summary.as_str())?;
        }
        worksheet.write_string(row, 5, format_timestamp(&article.fetched_at))?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    workbook.save(path)?;
    Ok(())
}
