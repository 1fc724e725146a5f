//! Query and export tests over a file-backed archive

use chrono::{NaiveDate, TimeZone, Utc};
use news_ledger::export::{export, read_csv, read_json, ExportError, ExportFormat};
use news_ledger::query::{query, ArticleFilter};
use news_ledger::storage::{ArticleStore, InsertOutcome, SqliteStorage};
use news_ledger::Article;
use tempfile::TempDir;

fn article(
    title: &str,
    source: &str,
    url: &str,
    published: Option<(u32, u32)>,
    summary: Option<&str>,
) -> Article {
    Article {
        title: title.to_string(),
        source: source.to_string(),
        url: url.to_string(),
        published_at: published.map(|(day, hour)| {
            Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
        }),
        summary: summary.map(str::to_string),
        fetched_at: Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap(),
    }
}

/// Archive with a mix of sources, dates and missing optional fields
fn populated_archive(dir: &TempDir) -> SqliteStorage {
    let mut storage = SqliteStorage::new(&dir.path().join("news.db")).unwrap();
    let articles = [
        article(
            "Storm hits coast",
            "BBC News",
            "https://a.com/1",
            None,
            Some("Heavy wind, then \"calm\""),
        ),
        article(
            "Election results",
            "Reuters",
            "https://b.com/1",
            Some((2, 9)),
            Some("Final count"),
        ),
        article(
            "Markets rally",
            "BBC News",
            "https://a.com/2",
            Some((1, 7)),
            None,
        ),
    ];
    for a in &articles {
        assert_eq!(storage.insert(a).unwrap(), InsertOutcome::Inserted);
    }
    storage
}

#[test]
fn test_json_export_round_trips_query_results() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);
    let results = query(&storage, &ArticleFilter::new()).unwrap();
    assert_eq!(results.len(), 3);

    let path = dir.path().join("out.json");
    export(&results, ExportFormat::Json, &path).unwrap();

    assert_eq!(read_json(&path).unwrap(), results);
}

#[test]
fn test_csv_export_round_trips_query_results() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);
    let results = query(&storage, &ArticleFilter::new()).unwrap();

    let path = dir.path().join("out.csv");
    export(&results, ExportFormat::Csv, &path).unwrap();

    assert_eq!(read_csv(&path).unwrap(), results);
}

#[test]
fn test_filtered_export_contains_only_matches() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);

    let filter = ArticleFilter::new().with_source("bbc news");
    let results = query(&storage, &filter).unwrap();

    let path = dir.path().join("bbc.json");
    export(&results, ExportFormat::Json, &path).unwrap();

    let exported = read_json(&path).unwrap();
    assert_eq!(exported.len(), 2);
    assert!(exported.iter().all(|a| a.source == "BBC News"));
    // Newest effective date first: fetched on the 3rd beats published on the 1st
    assert_eq!(exported[0].url, "https://a.com/1");
    assert_eq!(exported[1].url, "https://a.com/2");
}

#[test]
fn test_date_filter_uses_effective_date() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);

    let jan_3 = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
    let results = query(&storage, &ArticleFilter::new().with_date(jan_3)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Storm hits coast");

    let jan_2 = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let results = query(&storage, &ArticleFilter::new().with_date(jan_2)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "Reuters");
}

#[test]
fn test_empty_csv_export_is_header_only() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);

    let results = query(&storage, &ArticleFilter::new().with_keyword("volcano")).unwrap();
    assert!(results.is_empty());

    let path = dir.path().join("empty.csv");
    export(&results, ExportFormat::Csv, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert_eq!(
        content.trim_end(),
        "title,source,url,published_at,summary,fetched_at"
    );
}

#[test]
fn test_excel_export_writes_workbook() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);
    let results = query(&storage, &ArticleFilter::new()).unwrap();

    let path = dir.path().join("out.xlsx");
    export(&results, ExportFormat::Excel, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_unsupported_format_is_rejected() {
    let result = "pdf".parse::<ExportFormat>();
    assert!(matches!(result, Err(ExportError::UnsupportedFormat(_))));
}

#[test]
fn test_unwritable_destination_is_io_error() {
    let dir = TempDir::new().unwrap();
    let storage = populated_archive(&dir);
    let results = query(&storage, &ArticleFilter::new()).unwrap();

    let path = dir.path().join("no-such-dir").join("out.json");
    for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Excel] {
        let result = export(&results, format, &path);
        assert!(
            matches!(result, Err(ExportError::Io(_))),
            "{} export should fail with an IO error",
            format
        );
    }
}

#[test]
fn test_first_write_wins_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("news.db");

    {
        let mut storage = SqliteStorage::new(&path).unwrap();
        let first = article("Original", "A", "https://a.com/1", None, None);
        let other = article("Other", "A", "https://a.com/2", None, None);
        assert_eq!(storage.insert(&first).unwrap(), InsertOutcome::Inserted);
        assert_eq!(storage.insert(&other).unwrap(), InsertOutcome::Inserted);
        storage.close().unwrap();
    }

    let mut storage = SqliteStorage::new(&path).unwrap();
    let rewrite = article("Rewritten", "B", "https://a.com/1", Some((2, 0)), Some("x"));
    assert_eq!(storage.insert(&rewrite).unwrap(), InsertOutcome::Skipped);

    let stored = query(&storage, &ArticleFilter::new()).unwrap();
    assert_eq!(stored.len(), 2);
    let kept = stored.iter().find(|a| a.url == "https://a.com/1").unwrap();
    assert_eq!(kept.title, "Original");
    assert_eq!(kept.source, "A");
}
