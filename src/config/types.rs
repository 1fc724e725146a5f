use serde::Deserialize;

/// Main configuration structure for News-Ledger
///
/// Every section has defaults, so an empty (or absent) file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub http: HttpConfig,
    pub scraper: ScraperConfig,
    pub newsapi: NewsApiConfig,
}

/// Where the article archive lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "news.db".to_string(),
        }
    }
}

/// HTTP client behavior shared by all sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts after a transient failure (transport error, 5xx, 429)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Pause between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "Mozilla/5.0 (compatible; news-ledger/{})",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Scraped listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub enabled: bool,

    /// Source label stored on every scraped article
    pub label: String,

    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Upper bound on headlines taken from one listing
    #[serde(rename = "max-headlines")]
    pub max_headlines: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "BBC News".to_string(),
            listing_url: "https://www.bbc.com/news".to_string(),
            max_headlines: 20,
        }
    }
}

/// NewsAPI top-headlines endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub endpoint: String,

    pub language: String,

    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Key used when none is given on the command line
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/top-headlines".to_string(),
            language: "en".to_string(),
            page_size: 20,
            api_key: None,
        }
    }
}
