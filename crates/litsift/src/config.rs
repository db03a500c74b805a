//! Configuration for LitSift.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Rate limit delay between requests without API key (1s = 1 req/s).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

    /// Rate limit delay between requests with API key (100ms = 10 req/s).
    pub const RATE_LIMIT_DELAY_WITH_KEY: Duration = Duration::from_millis(100);

    /// Wait used when a 429 response carries no usable Retry-After header.
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 15;

    /// Upper bound on a single rate-limit wait.
    pub const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

    /// Rate-limited attempts per page before giving up.
    pub const RATE_LIMIT_RETRIES: u32 = 5;

    /// Records per search page (API maximum).
    pub const PAGE_SIZE: u32 = 100;

    /// Hard cap of the search endpoint (offset + limit must stay below it).
    pub const MAX_RESULTS_CAP: u32 = 1000;

    /// Default number of records fetched per search.
    pub const DEFAULT_MAX_RESULTS: u32 = 100;

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 256;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 4;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Paper field sets for API requests.
pub mod fields {
    /// Everything a [`Record`](crate::models::Record) is built from.
    pub const SEARCH: &[&str] = &[
        "paperId",
        "title",
        "authors",
        "year",
        "venue",
        "citationCount",
        "influentialCitationCount",
        "tldr",
        "abstract",
        "publicationTypes",
        "externalIds",
        "openAccessPdf",
        "url",
        "citationStyles",
    ];
}

/// Client and fetch configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional).
    pub api_key: Option<String>,

    /// Base URL for Graph API (for testing with mock servers).
    pub graph_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Rate limit delay between requests.
    pub rate_limit_delay: Duration,

    /// Retry-After used when the header is absent.
    pub default_retry_after: Duration,

    /// Longest single wait after a 429.
    pub max_rate_limit_wait: Duration,

    /// Rate-limited attempts per page.
    pub rate_limit_retries: u32,

    /// Transient-failure retries inside the HTTP middleware.
    pub transport_retries: u32,

    /// Records per page.
    pub page_size: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration with optional API key.
    ///
    /// The request pacing is tightened when a key is present:
    /// - Without key: 1 req/s
    /// - With key: 10 req/s
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let has_key = api_key.is_some();
        Self {
            api_key,
            graph_api_url: api::GRAPH_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay: if has_key {
                api::RATE_LIMIT_DELAY_WITH_KEY
            } else {
                api::RATE_LIMIT_DELAY
            },
            default_retry_after: Duration::from_secs(api::DEFAULT_RETRY_AFTER_SECS),
            max_rate_limit_wait: api::MAX_RATE_LIMIT_WAIT,
            rate_limit_retries: api::RATE_LIMIT_RETRIES,
            transport_retries: 3,
            page_size: api::PAGE_SIZE,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: None,
            graph_api_url: format!("{}/graph/v1", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::from_millis(0), // No delay in tests
            default_retry_after: Duration::from_millis(0),
            max_rate_limit_wait: Duration::from_millis(10),
            rate_limit_retries: 2,
            transport_retries: 0,
            page_size: api::PAGE_SIZE,
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads a `.env` file from the working directory first when one exists.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok().filter(|k| !k.is_empty());
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("LITSIFT_GRAPH_API_URL") {
            anyhow::ensure!(url.starts_with("http"), "LITSIFT_GRAPH_API_URL must be an http(s) URL");
            config.graph_api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    /// Replace the API key (when one is given) and re-derive request pacing.
    #[must_use]
    pub fn with_api_key(self, api_key: Option<String>) -> Self {
        match api_key.filter(|k| !k.is_empty()) {
            Some(key) => Self {
                api_key: Some(key),
                rate_limit_delay: api::RATE_LIMIT_DELAY_WITH_KEY,
                ..self
            },
            None => self,
        }
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Clamp a requested result count to what the search endpoint serves.
    #[must_use]
    pub fn clamp_max_results(requested: u32) -> u32 {
        requested.clamp(1, api::MAX_RESULTS_CAP)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
