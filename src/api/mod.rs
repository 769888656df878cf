//! Thin async HTTP client for the case search backend.
//!
//! All calls resolve to the decoded body on success and to a normalized
//! [`ApiError`] on any failure. Nothing is retried.

pub mod backend;
pub mod error;

pub use backend::{AutoSearchResponse, ProxyTokenResponse, SearchBackend};
pub use error::{ApiError, ApiErrorKind};

use crate::config::ApiSettings;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Timeout applied when neither the client nor the call overrides it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Per-call overrides, merged on top of the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Case search API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    default_timeout: Duration,
}

impl ApiClient {
    /// Create a client for an already-resolved base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client from config, resolving the base URL against the environment
    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.resolve_base_url())
            .with_default_timeout(Duration::from_millis(settings.timeout_ms))
    }

    /// Zero keeps the current default
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.default_timeout = timeout;
        }
        self
    }

    /// Caller timeout if set and non-zero, else the client default
    fn timeout_for(&self, config: Option<&RequestConfig>) -> Duration {
        config
            .and_then(|c| c.timeout)
            .filter(|t| !t.is_zero())
            .unwrap_or(self.default_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint, adding the leading `/` when missing
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Send a GET request with optional query parameters
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        config: Option<&RequestConfig>,
    ) -> Result<T, ApiError> {
        let url = self.url_for(endpoint);
        let mut builder = self.client.get(&url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        self.execute("GET", &url, builder, config).await
    }

    /// Send a POST request with an optional JSON body
    pub async fn post<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(endpoint);
        let mut builder = self.client.post(&url);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| report("POST", &url, ApiError::config(e.to_string())))?;
            builder = builder.body(payload);
        }
        self.execute("POST", &url, builder, config).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &str,
        builder: RequestBuilder,
        config: Option<&RequestConfig>,
    ) -> Result<T, ApiError> {
        let timeout = self.timeout_for(config);
        let headers = merge_headers(config).map_err(|e| report(method, url, e))?;

        tracing::debug!(method, url, timeout_ms = timeout.as_millis() as u64, "api request");

        let response = builder
            .timeout(timeout)
            .headers(headers)
            .send()
            .await
            .map_err(|e| report(method, url, ApiError::from_reqwest(&e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "failed reading response body");
                report(method, url, ApiError::unreadable(status.as_u16()))
            })?;

        if !status.is_success() {
            return Err(report(method, url, ApiError::from_response(status.as_u16(), &text)));
        }

        let raw = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(raw).map_err(|e| {
            tracing::debug!(error = %e, "response body did not match the expected shape");
            report(method, url, ApiError::undecodable(status.as_u16(), &text))
        })
    }
}

/// Default headers with the caller's headers laid over them
fn merge_headers(config: Option<&RequestConfig>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in config.map(|c| c.headers.as_slice()).unwrap_or_default() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::config(format!("invalid value for header {name}: {e}")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Log a normalized error once on its way back to the caller
fn report(method: &'static str, url: &str, err: ApiError) -> ApiError {
    tracing::error!(
        method,
        url,
        kind = ?err.kind,
        status = err.status,
        message = %err.message,
        details = ?err.details,
        "api request failed"
    );
    err
}
