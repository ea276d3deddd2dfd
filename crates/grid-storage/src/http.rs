//! HTTP byte retrieval using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{ByteFetcher, FetchedBytes};

/// Request options applied to every descriptor and chunk fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpFetcherConfig {
    /// Total request timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Extra headers sent with every request (name, value).
    pub headers: Vec<(String, String)>,
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            headers: Vec::new(),
            use_system_proxy: true,
        }
    }
}

impl HttpFetcherConfig {
    /// Load from `FETCH_TIMEOUT_SECS`, `FETCH_CONNECT_TIMEOUT_SECS` and
    /// `FETCH_NO_PROXY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("FETCH_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("FETCH_NO_PROXY") {
            config.use_system_proxy = !matches!(val.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Bypass any proxy configured in the environment.
    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn header_map(&self) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        // Ask for compressed bodies; reqwest is built without auto-decompression,
        // so gzip bytes reach decode_payload intact.
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Config(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::Config(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

/// Fetches locators as HTTP(S) URLs.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request options.
    pub fn new(config: &HttpFetcherConfig) -> FetchResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(config.header_map()?)
            .tcp_nodelay(true);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    #[instrument(skip(self), fields(backend = "http"))]
    async fn fetch(&self, locator: &str) -> FetchResult<FetchedBytes> {
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| FetchError::transport(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(locator, e))?;

        debug!(size = bytes.len(), encoding = ?content_encoding, "Fetched");
        Ok(FetchedBytes {
            bytes,
            content_encoding,
        })
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
