//! Semantic Scholar API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff for transient failures
//! - Request pacing (1 req/s without a key, 10 req/s with one)
//! - Response caching with 5-minute TTL
//!
//! [`RecordSource`] is the seam the fetcher and session depend on, so they
//! can be driven by an in-memory source in tests.

mod pagination;

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
    Retryable, RetryableStrategy, RetryTransientMiddleware, default_on_request_failure,
    default_on_request_success, policies::ExponentialBackoff,
};

pub use pagination::{FetchPlan, FetchStep, Progress, fetch_all, pages};

use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::models::SearchResult;

/// Anything that can serve pages of search results.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of results for `query`.
    async fn search_page(&self, query: &str, offset: u32, limit: u32) -> ClientResult<SearchResult>;
}

/// Semantic Scholar API client.
#[derive(Clone)]
pub struct SemanticScholarClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// API key (optional).
    api_key: Option<String>,

    /// Graph API base URL.
    graph_api_url: String,

    /// Delay before each uncached request.
    rate_limit_delay: Duration,

    /// Retry-After assumed when a 429 carries none.
    default_retry_after: Duration,
}

impl SemanticScholarClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref key) = config.api_key {
            headers.insert("x-api-key", key.parse()?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.transport_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                TransientExcept429,
            ))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            api_key: config.api_key.clone(),
            graph_api_url: config.graph_api_url.clone(),
            rate_limit_delay: config.rate_limit_delay,
            default_retry_after: config.default_retry_after,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search for papers.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_papers(
        &self,
        query: &str,
        offset: u32,
        limit: u32,
        fields: &[&str],
    ) -> ClientResult<SearchResult> {
        let url = format!("{}/paper/search", self.graph_api_url);

        let params = vec![
            ("query".to_string(), query.to_string()),
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
            ("fields".to_string(), fields.join(",")),
        ];

        self.get(&url, &params).await
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        // Check cache
        let cache_key = self.cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!(url, "Cache hit");
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        // Rate limit
        tokio::time::sleep(self.rate_limit_delay).await;

        tracing::debug!(url, "GET");
        let response = self.client.get(url).query(params).send().await?;

        let response = self.handle_response(response).await?;
        let body = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;

        // Cache response
        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        tracing::warn!(status = status.as_u16(), "API returned error status");

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map_or(self.default_retry_after, Duration::from_secs);

                Err(ClientError::RateLimited { retry_after })
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Default transient classification, minus 429.
///
/// Rate limits are retried by the pager, which honours `Retry-After`.
struct TransientExcept429;

impl RetryableStrategy for TransientExcept429 {
    fn handle(&self, res: &Result<reqwest::Response, reqwest_middleware::Error>) -> Option<Retryable> {
        match res {
            Ok(response) if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => None,
            Ok(response) => default_on_request_success(response),
            Err(error) => default_on_request_failure(error),
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for SemanticScholarClient {
    async fn search_page(&self, query: &str, offset: u32, limit: u32) -> ClientResult<SearchResult> {
        self.search_papers(query, offset, limit, fields::SEARCH).await
    }
}

impl std::fmt::Debug for SemanticScholarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScholarClient").field("has_api_key", &self.has_api_key()).finish()
    }
}
