//! HTTP client for catalog requests with rate limiting and error handling
//!
//! Every response is checked for a success status and decoded as JSON here,
//! so callers only ever see a [`TransportError`] or a typed body.

use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use url::Url;

use crate::crawling::workers::TransportError;
use crate::infrastructure::config::defaults;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// 0 disables rate limiting
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

/// Shared HTTP client; cheap to wrap in an `Arc` and hand to several fetchers.
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| TransportError::Client(format!("Invalid user agent: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| TransportError::Client(format!("Failed to create HTTP client: {e}")))?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// GET `url` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| TransportError::Network {
            url: url.to_string(),
            reason: format!("Failed to read response body: {e}"),
        })?;

        tracing::trace!("Fetched {} ({} bytes)", url, body.len());
        decode_json(url, &body)
    }

    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

/// Decode a response body, mapping shape mismatches to [`TransportError::Malformed`].
pub fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
