use serde::{Deserialize, Serialize};

/// Fallback API base URL when neither the environment nor the config file sets one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable that overrides the API base URL
pub const API_URL_ENV: &str = "FABAO_API_URL";

/// Default per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Write debug logs to a file
    #[serde(default)]
    pub debug: bool,

    /// Log file or directory (defaults next to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    /// How debug log files are rotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<LogRotation>,

    /// How many rotated log files to keep (0 keeps everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the case search API, e.g. `http://localhost:5000/api`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds; 0 means the 30 s default
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ApiSettings {
    /// Resolve the base URL against the process environment.
    ///
    /// Call once at startup and hand the result to [`crate::api::ApiClient::new`].
    pub fn resolve_base_url(&self) -> String {
        resolve_base_url(std::env::var(API_URL_ENV).ok(), self.base_url.as_deref())
    }
}

/// Pick the base URL: environment override, then config file, then the default.
///
/// Blank values are skipped and trailing slashes trimmed.
pub fn resolve_base_url(env_override: Option<String>, configured: Option<&str>) -> String {
    let chosen = env_override
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| configured.map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or(DEFAULT_API_BASE_URL);

    chosen.trim_end_matches('/').to_string()
}

/// Debug log rotation policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Append to a single file
    Never,
    /// One file per day
    Daily,
    /// One timestamped file per run
    Session,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
