//! Fetch pipeline tests against mocked sources

use news_ledger::config::Config;
use news_ledger::pipeline::{run_fetch, SourceOutcome};
use news_ledger::query::{query, ArticleFilter};
use news_ledger::source::{FetchOptions, SourceError};
use news_ledger::storage::{ArticleStore, SqliteStorage};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"
<html><body>
  <a href="/news/articles/1">
    <h2 data-testid="card-headline">Storm hits coast</h2>
    <p data-testid="card-description">Heavy wind overnight</p>
  </a>
  <a href="/news/articles/2">
    <h2 data-testid="card-headline">Markets rally</h2>
  </a>
  <div>
    <h2 data-testid="card-headline">Card without a link</h2>
  </div>
</body></html>
"#;

/// Points every source at the mock server and the database into `dir`
fn create_test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.database_path = dir.join("news.db").display().to_string();
    config.http.max_retries = 0;
    config.http.retry_delay_ms = 0;
    config.scraper.listing_url = format!("{}/news", server.uri());
    config.newsapi.endpoint = format!("{}/v2/top-headlines", server.uri());
    config
}

fn api_options() -> FetchOptions {
    FetchOptions {
        api_key: Some("test-key".to_string()),
        keyword: None,
    }
}

fn api_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Reuters"},
                "title": "Election results announced",
                "url": "https://reuters.example/world/1",
                "publishedAt": "2025-01-02T10:00:00Z",
                "description": "Final count is in"
            },
            {
                "source": {"id": null, "name": null},
                "title": "[Removed]",
                "url": "https://removed.com"
            },
            {
                "source": {"id": "bbc-news", "name": "BBC News"},
                "title": "STORM HITS COAST",
                "url": "https://bbc.example/storm",
                "publishedAt": "2025-01-02T08:00:00Z",
                "description": null
            }
        ]
    })
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(server)
        .await;
}

async fn mount_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_body()))
        .mount(server)
        .await;
}

fn open(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.storage.database_path)).unwrap()
}

#[tokio::test]
async fn test_fetch_stores_articles_from_both_sources() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let report = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.fetched(), 6);
    // Link-less card and the removed API entry
    assert_eq!(report.skipped_invalid, 2);
    // Same title as the scraped storm story
    assert_eq!(report.batch_duplicates, 1);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.already_stored, 0);
    assert_eq!(report.failed_sources().count(), 0);

    let articles = query(&storage, &ArticleFilter::new()).unwrap();
    assert_eq!(articles.len(), 3);

    let storm = articles
        .iter()
        .find(|a| a.title == "Storm hits coast")
        .unwrap();
    assert_eq!(storm.source, "BBC News");
    assert_eq!(storm.url, format!("{}/news/articles/1", server.uri()));
    assert_eq!(storm.summary.as_deref(), Some("Heavy wind overnight"));
    assert!(storm.published_at.is_none());

    let election = articles
        .iter()
        .find(|a| a.source == "Reuters")
        .unwrap();
    assert_eq!(election.url, "https://reuters.example/world/1");
    assert!(election.published_at.is_some());
}

#[tokio::test]
async fn test_second_fetch_is_idempotent() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());

    let mut storage = open(&config);
    let first = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();
    let count_after_first = storage.count_articles().unwrap();
    storage.close().unwrap();

    // Reopen to make sure the second run sees the persisted rows
    let mut storage = open(&config);
    let second = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    assert_eq!(first.inserted, 3);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.already_stored, 3);
    assert_eq!(storage.count_articles().unwrap(), count_after_first);
}

#[tokio::test]
async fn test_blank_api_key_skips_newsapi() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_body()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let options = FetchOptions {
        api_key: Some("   ".to_string()),
        keyword: None,
    };
    let report = run_fetch(&config, &options, &mut storage).await.unwrap();

    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].name, "BBC News");
    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn test_auth_failure_is_recorded_and_run_continues() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let report = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    let failed: Vec<_> = report.failed_sources().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "NewsAPI");
    assert!(matches!(failed[0].1, SourceError::Auth { .. }));

    assert_eq!(report.inserted, 2);
    assert_eq!(storage.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": "error",
            "code": "rateLimited",
            "message": "You have made too many requests recently."
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let report = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    let failed: Vec<_> = report.failed_sources().collect();
    assert_eq!(failed.len(), 1);
    assert!(matches!(failed[0].1, SourceError::RateLimit { .. }));
    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn test_layout_change_is_parse_error() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Redesigned front page</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let report = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    match &report.sources[0].outcome {
        SourceOutcome::Failed(SourceError::Parse { origin, .. }) => {
            assert_eq!(origin, "BBC News");
        }
        other => panic!("expected a parse failure, got {:?}", other),
    }

    // Both API stories survive once the scraped copy is gone
    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn test_server_error_on_listing_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let report = run_fetch(&config, &FetchOptions::default(), &mut storage)
        .await
        .unwrap();

    let failed: Vec<_> = report.failed_sources().collect();
    assert_eq!(failed.len(), 1);
    assert!(matches!(failed[0].1, SourceError::Fetch { .. }));
    assert_eq!(report.inserted, 0);
    assert_eq!(storage.count_articles().unwrap(), 0);
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_listing(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path());
    config.http.max_retries = 1;
    let mut storage = open(&config);

    let report = run_fetch(&config, &FetchOptions::default(), &mut storage)
        .await
        .unwrap();

    assert_eq!(report.failed_sources().count(), 0);
    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn test_keyword_is_sent_to_newsapi() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("q", "election"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("language", "en"))
        .and(query_param("pageSize", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, dir.path());
    let mut storage = open(&config);

    let options = FetchOptions {
        api_key: Some("test-key".to_string()),
        keyword: Some("election".to_string()),
    };
    let report = run_fetch(&config, &options, &mut storage).await.unwrap();

    assert_eq!(report.failed_sources().count(), 0);
    assert_eq!(report.inserted, 3);
}

#[tokio::test]
async fn test_disabled_scraper_uses_only_newsapi() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server, dir.path());
    config.scraper.enabled = false;
    let mut storage = open(&config);

    let report = run_fetch(&config, &api_options(), &mut storage)
        .await
        .unwrap();

    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].name, "NewsAPI");
    assert_eq!(report.inserted, 2);

    let bbc = query(&storage, &ArticleFilter::new().with_source("bbc news")).unwrap();
    assert_eq!(bbc.len(), 1);
    assert_eq!(bbc[0].url, "https://bbc.example/storm");
}
