use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::transport::TransportError;

/// Failure taxonomy surfaced to callers as `error_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input; never reaches the network.
    ValidationError,
    /// 401 or an invalid/expired credential.
    AuthError,
    /// 429; callers may receive a retry advisory instead.
    RateLimited,
    /// 404 or an empty lookup.
    NotFound,
    /// 5xx.
    ServerError,
    /// Anything unclassified.
    ApiError,
}

static STATUS_IN_TEXT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b([45]\d{2})\b").ok());

impl ErrorKind {
    /// Wire name used in `error_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::AuthError => "auth_error",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::ApiError => "api_error",
        }
    }

    /// Classify a failure from an optional status code and its message.
    ///
    /// When `status` is absent, a 4xx/5xx code embedded in the message
    /// (`"HTTP 429: Too Many Requests"`) is used instead. Status checks win
    /// over substring checks within each rule, and rules are tried in the
    /// order auth, rate limit, validation, not found, server.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        let status = status.or_else(|| {
            STATUS_IN_TEXT
                .as_ref()
                .and_then(|re| re.captures(message))
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        });
        let lower = message.to_lowercase();

        if status == Some(401) || lower.contains("unauthorized") {
            Self::AuthError
        } else if status == Some(429)
            || lower.contains("too many requests")
            || lower.contains("rate limit")
        {
            Self::RateLimited
        } else if matches!(status, Some(400 | 422))
            || lower.contains("validation")
            || lower.contains("invalid")
        {
            Self::ValidationError
        } else if status == Some(404) || lower.contains("not found") {
            Self::NotFound
        } else if matches!(status, Some(500..=599)) {
            Self::ServerError
        } else {
            Self::ApiError
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for all action operations.
///
/// Every variant is turned into a failure envelope at the registry
/// boundary; nothing here is ever returned to the caller as an `Err`.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Input validation failed before any network call.
    #[error("{0}")]
    Validation(String),

    /// A network call failed, or the vendor answered with an error status.
    #[error("{message}")]
    Api {
        /// Classified failure kind.
        kind: ErrorKind,
        /// Human-readable error message.
        message: String,
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Vendor error code (`AccessDeniedException`, `190`, ...).
        code: Option<String>,
        /// Vendor-supplied `Retry-After`.
        retry_after: Option<Duration>,
    },

    /// The vendor answered 2xx with an error-shaped body.
    ///
    /// `fields` are merged verbatim into the failure envelope.
    #[error("{message}")]
    Vendor {
        /// Human-readable error message.
        message: String,
        /// Extra envelope fields (`statusCode`, vendor `message`, ...).
        fields: Map<String, Value>,
    },

    /// Execution cancelled via cancellation token.
    #[error("cancelled")]
    Cancelled,
}

impl ActionError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Validation error for a missing required field.
    pub fn required(field: &str) -> Self {
        Self::Validation(format!("{field} is required"))
    }

    /// Create an API error of an explicit kind.
    pub fn api(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self::Api {
            kind,
            message: msg.into(),
            status: None,
            code: None,
            retry_after: None,
        }
    }

    /// Create an API error, classifying it from its message text.
    pub fn from_message(msg: impl Into<String>) -> Self {
        let message = msg.into();
        Self::api(ErrorKind::classify(None, &message), message)
    }

    /// Create an API error from a non-2xx status.
    pub fn http(status: u16, msg: impl Into<String>) -> Self {
        let message = msg.into();
        Self::Api {
            kind: ErrorKind::classify(Some(status), &message),
            message,
            status: Some(status),
            code: None,
            retry_after: None,
        }
    }

    /// Create a vendor error carrying extra envelope fields.
    pub fn vendor(msg: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self::Vendor {
            message: msg.into(),
            fields,
        }
    }

    /// Attach a vendor error code.
    pub fn with_code(mut self, vendor_code: impl Into<String>) -> Self {
        if let Self::Api { code, .. } = &mut self {
            *code = Some(vendor_code.into());
        }
        self
    }

    /// Attach a `Retry-After` hint.
    pub fn with_retry_after(mut self, delay: Option<Duration>) -> Self {
        if let Self::Api { retry_after, .. } = &mut self {
            *retry_after = delay;
        }
        self
    }

    /// Rewrite the human message, keeping classification.
    pub fn map_message(mut self, f: impl FnOnce(&str) -> String) -> Self {
        match &mut self {
            Self::Validation(message) | Self::Api { message, .. } | Self::Vendor { message, .. } => {
                *message = f(message);
            }
            Self::Cancelled => {}
        }
        self
    }

    /// Classified failure kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Api { kind, .. } => *kind,
            Self::Vendor { .. } | Self::Cancelled => ErrorKind::ApiError,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Vendor error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Vendor-supplied `Retry-After`, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns `true` for input validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` when the failure happened at the network boundary.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Cancelled)
    }
}

impl From<TransportError> for ActionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => Self::Cancelled,
            other => Self::from_message(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some(401), "", ErrorKind::AuthError)]
    #[case(None, "Unauthorized access", ErrorKind::AuthError)]
    #[case(Some(429), "", ErrorKind::RateLimited)]
    #[case(None, "HTTP 429: Too Many Requests", ErrorKind::RateLimited)]
    #[case(None, "Rate limit exceeded for this API", ErrorKind::RateLimited)]
    #[case(Some(400), "", ErrorKind::ValidationError)]
    #[case(Some(422), "", ErrorKind::ValidationError)]
    #[case(None, "Invalid product_id", ErrorKind::ValidationError)]
    #[case(Some(404), "", ErrorKind::NotFound)]
    #[case(None, "resource not found", ErrorKind::NotFound)]
    #[case(Some(503), "", ErrorKind::ServerError)]
    #[case(None, "500 Server Error", ErrorKind::ServerError)]
    #[case(Some(418), "", ErrorKind::ApiError)]
    #[case(None, "Connection timeout", ErrorKind::ApiError)]
    fn classification(
        #[case] status: Option<u16>,
        #[case] message: &str,
        #[case] expected: ErrorKind,
    ) {
        assert_eq!(ErrorKind::classify(status, message), expected);
    }

    #[test]
    fn status_embedded_in_longer_numbers_is_ignored() {
        assert_eq!(ErrorKind::classify(None, "order 14045 failed"), ErrorKind::ApiError);
    }

    #[test]
    fn required_message_names_field() {
        let err = ActionError::required("event_id");
        assert_eq!(err.to_string(), "event_id is required");
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn builders_attach_metadata() {
        let err = ActionError::http(429, "slow down")
            .with_code("Throttling")
            .with_retry_after(Some(Duration::from_secs(12)));
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.code(), Some("Throttling"));
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn map_message_keeps_kind() {
        let err = ActionError::http(404, "no ride").map_message(|m| format!("lookup: {m}"));
        assert_eq!(err.to_string(), "lookup: no ride");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn transport_errors_classify_from_text() {
        let err = ActionError::from(TransportError::Timeout("deadline".into()));
        assert_eq!(err.kind(), ErrorKind::ApiError);
        assert!(matches!(ActionError::from(TransportError::Cancelled), ActionError::Cancelled));
    }
}
