//! HTTP client with request timing and no-cache requests.

use std::time::{Duration, Instant};

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::error::LoadError;

const USER_AGENT: &str = concat!("EduHub/", env!("CARGO_PKG_VERSION"), " (study notes)");

/// Resolve user agent from config value.
/// - None or empty => default EduHub user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some(custom) if custom.trim().is_empty() => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// HTTP client for manifest and directory-listing requests.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        Self::with_user_agent(timeout, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    pub fn with_user_agent(
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, LoadError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(LoadError::Client)?;

        Ok(Self { client })
    }

    /// Make a GET request that bypasses intermediate caches.
    ///
    /// Non-success statuses are returned as responses, not errors.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, LoadError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|source| LoadError::Network {
                url: url.to_string(),
                source,
            })?;

        debug!(
            "GET {} -> {} in {}ms",
            url,
            response.status().as_u16(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            url: url.to_string(),
            status: response.status(),
            response,
        })
    }

    /// GET a URL and return its body, treating non-success statuses as errors.
    pub async fn get_text(&self, url: &str) -> Result<String, LoadError> {
        let response = self.get(url).await?;
        if !response.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: response.status.as_u16(),
            });
        }
        response.text().await
    }
}

/// HTTP response wrapper.
pub struct HttpResponse {
    url: String,
    pub status: StatusCode,
    response: Response,
}

impl HttpResponse {
    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Get response body as text.
    pub async fn text(self) -> Result<String, LoadError> {
        let url = self.url;
        self.response
            .text()
            .await
            .map_err(|source| LoadError::Network { url, source })
    }
}
