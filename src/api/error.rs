use serde_json::Value;

/// Message used when a request was sent but no response came back
pub const NO_RESPONSE_MESSAGE: &str = "服务器无响应";

/// Message used when a request could not be built and the error had no text
pub const CONFIG_ERROR_MESSAGE: &str = "请求配置错误";

/// Status reported when there is no real HTTP status to report
pub const SENTINEL_STATUS: u16 = 500;

/// Where a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Sent, but nothing came back (timeout, refused, reset)
    Transport,
    /// A response arrived but it was an error status or unreadable
    Server,
    /// The request was never dispatched
    Config,
}

/// Normalized failure of any API call.
///
/// Every error the HTTP client can hit is folded into this one shape before it
/// reaches the caller.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
    /// Full response body when a response was received
    pub details: Option<Value>,
}

impl ApiError {
    /// Build an error from a non-2xx response body.
    ///
    /// Uses the body's `message` field when present, else `请求失败 (<status>)`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let details = parse_body(body);
        let message = details
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| failed_with_status(status));

        Self {
            kind: ApiErrorKind::Server,
            status,
            message,
            details,
        }
    }

    /// A 2xx response whose body did not decode into the expected type
    pub fn undecodable(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::Server,
            status,
            message: failed_with_status(status),
            details: parse_body(body),
        }
    }

    /// The status line arrived but reading the body failed
    pub fn unreadable(status: u16) -> Self {
        Self {
            kind: ApiErrorKind::Server,
            status,
            message: failed_with_status(status),
            details: None,
        }
    }

    pub fn no_response() -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: SENTINEL_STATUS,
            message: NO_RESPONSE_MESSAGE.to_string(),
            details: None,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ApiErrorKind::Config,
            status: SENTINEL_STATUS,
            message: if message.trim().is_empty() {
                CONFIG_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            details: None,
        }
    }

    /// Classify a reqwest error raised before a response was read.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            let message = match std::error::Error::source(err) {
                Some(source) => format!("{err}: {source}"),
                None => err.to_string(),
            };
            return Self::config(message);
        }

        Self::no_response()
    }
}

fn failed_with_status(status: u16) -> String {
    format!("请求失败 ({status})")
}

/// JSON body if it parses, the raw text otherwise, `None` when empty
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_field_is_preferred() {
        let err = ApiError::from_response(400, r#"{"status":400,"message":"请求数据不能为空"}"#);
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "请求数据不能为空");
        assert_eq!(err.details, Some(json!({"status": 400, "message": "请求数据不能为空"})));
    }

    #[test]
    fn missing_message_uses_status_text() {
        let err = ApiError::from_response(502, "Bad Gateway");
        assert_eq!(err.message, "请求失败 (502)");
        assert_eq!(err.details, Some(Value::String("Bad Gateway".to_string())));
    }

    #[test]
    fn empty_body_has_no_details() {
        let err = ApiError::from_response(404, "");
        assert_eq!(err.message, "请求失败 (404)");
        assert!(err.details.is_none());
    }

    #[test]
    fn blank_config_message_falls_back() {
        let err = ApiError::config("");
        assert_eq!(err.kind, ApiErrorKind::Config);
        assert_eq!(err.status, SENTINEL_STATUS);
        assert_eq!(err.message, CONFIG_ERROR_MESSAGE);
    }

    #[test]
    fn unreadable_body_keeps_status() {
        let err = ApiError::unreadable(200);
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.status, 200);
        assert_eq!(err.message, "请求失败 (200)");
        assert!(err.details.is_none());
    }

    #[test]
    fn display_includes_status() {
        assert_eq!(ApiError::no_response().to_string(), "服务器无响应 (status 500)");
    }
}
