use super::{ApiClient, ApiError};
use crate::search::KeywordGroup;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const AUTO_SEARCH_ENDPOINT: &str = "/search/auto";
pub const PROXY_TOKEN_ENDPOINT: &str = "/proxy/token";

/// Body of `POST /search/auto`.
///
/// Success and failure share one shape and are told apart by `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoSearchResponse {
    #[serde(default)]
    pub data: Option<Vec<KeywordGroup>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AutoSearchResponse {
    /// Split into the generated groups or the server's error message
    pub fn into_result(self) -> Result<Vec<KeywordGroup>, String> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(error);
        }
        self.data
            .ok_or_else(|| "response carried neither data nor error".to_string())
    }
}

/// Body of `POST /proxy/token`; only ever logged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyTokenResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct AutoSearchRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ProxyTokenRequest {
    data: Option<Value>,
}

/// Calls the search controller makes against the backend
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Turn free text into keyword groups
    async fn auto_search(&self, text: &str) -> Result<AutoSearchResponse, ApiError>;

    /// Follow-up proxied lookup after a successful auto search
    async fn proxy_token(&self) -> Result<ProxyTokenResponse, ApiError>;
}

#[async_trait::async_trait]
impl SearchBackend for ApiClient {
    async fn auto_search(&self, text: &str) -> Result<AutoSearchResponse, ApiError> {
        self.post(AUTO_SEARCH_ENDPOINT, Some(&AutoSearchRequest { text }), None)
            .await
    }

    async fn proxy_token(&self) -> Result<ProxyTokenResponse, ApiError> {
        self.post(PROXY_TOKEN_ENDPOINT, Some(&ProxyTokenRequest { data: None }), None)
            .await
    }
}
