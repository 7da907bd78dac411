//! API-specific error types
//!
//! Every failure of the authenticated client is surfaced as one `ApiError`.
//! Transport outcomes are classified exactly once, at the boundary, into the
//! kinds below; callers never see raw `reqwest` errors.

use std::time::Duration;

use thiserror::Error;

/// Classification of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400 - invalid input
    BadRequest,
    /// 401 - invalid or expired credentials (after the single retry)
    Unauthorized,
    /// 403 - insufficient permission
    Forbidden,
    /// 404 - resource absent
    NotFound,
    /// 5xx - upstream failure
    Server,
    /// No response received
    Network,
    /// Request exceeded the configured deadline
    Timeout,
    /// Any other HTTP status
    Unknown,
    /// Response body did not match the expected shape
    Decode,
    /// Client construction or request building failed
    Config,
    /// Session storage could not be read or written
    Storage,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected status {status}: {message}")]
    Unknown { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    ///
    /// A JSON body carrying `message` (or `error`) is kept as the detail;
    /// otherwise the raw body, or the canonical reason when empty.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unknown status")
                .to_string()
        });

        match status {
            400 => Self::BadRequest(message),
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            500..=599 => Self::Server { status, message },
            _ => Self::Unknown { status, message },
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::BadRequest(_) => ApiErrorKind::BadRequest,
            Self::Unauthorized(_) | Self::NoRefreshToken => ApiErrorKind::Unauthorized,
            Self::Forbidden(_) => ApiErrorKind::Forbidden,
            Self::NotFound(_) => ApiErrorKind::NotFound,
            Self::Server { .. } => ApiErrorKind::Server,
            Self::Network(_) => ApiErrorKind::Network,
            Self::Timeout(_) => ApiErrorKind::Timeout,
            Self::Unknown { .. } => ApiErrorKind::Unknown,
            Self::Decode(_) => ApiErrorKind::Decode,
            Self::Config(_) => ApiErrorKind::Config,
            Self::Storage(_) => ApiErrorKind::Storage,
        }
    }

    /// HTTP status behind this error, when there was a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } | Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthorized
    }

    /// Message suitable for showing to the dashboard user
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest(_) => "Invalid request. Please check your input and try again.".into(),
            Self::Unauthorized(_) | Self::NoRefreshToken => {
                "Your session is invalid or has expired. Please sign in again.".into()
            }
            Self::Forbidden(_) => "You do not have permission to perform this action.".into(),
            Self::NotFound(_) => "The requested resource was not found.".into(),
            Self::Server { .. } => "The server encountered an error. Please try again later.".into(),
            Self::Network(_) => {
                "Unable to reach the server. Please check your network connection.".into()
            }
            Self::Timeout(_) => "The request timed out. Please try again.".into(),
            Self::Unknown { status, .. } => format!("Unexpected error (status {status})."),
            Self::Decode(_) | Self::Config(_) | Self::Storage(_) => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let field = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str));
        if let Some(message) = field {
            return Some(message.to_string());
        }
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiError::from_status(400, "").kind(), ApiErrorKind::BadRequest);
        assert_eq!(ApiError::from_status(401, "").kind(), ApiErrorKind::Unauthorized);
        assert_eq!(ApiError::from_status(403, "").kind(), ApiErrorKind::Forbidden);
        assert_eq!(ApiError::from_status(404, "").kind(), ApiErrorKind::NotFound);
        assert_eq!(ApiError::from_status(502, "").kind(), ApiErrorKind::Server);
        assert_eq!(ApiError::from_status(409, "").kind(), ApiErrorKind::Unknown);
        assert_eq!(ApiError::from_status(302, "").kind(), ApiErrorKind::Unknown);
    }

    #[test]
    fn test_json_message_is_preserved() {
        let err = ApiError::from_status(400, r#"{"message":"email is required"}"#);
        assert_eq!(err, ApiError::BadRequest("email is required".into()));

        let err = ApiError::from_status(403, r#"{"error":"role ADMIN required"}"#);
        assert_eq!(err, ApiError::Forbidden("role ADMIN required".into()));
    }

    #[test]
    fn test_empty_body_uses_canonical_reason() {
        let err = ApiError::from_status(404, "  ");
        assert_eq!(err, ApiError::NotFound("Not Found".into()));
    }

    #[test]
    fn test_unknown_status_reports_code() {
        let err = ApiError::from_status(418, "teapot");
        assert_eq!(err.status(), Some(418));
        assert_eq!(err.user_message(), "Unexpected error (status 418).");
    }

    #[test]
    fn test_no_refresh_token_counts_as_unauthorized() {
        assert!(ApiError::NoRefreshToken.is_unauthorized());
        assert_eq!(ApiError::NoRefreshToken.status(), None);
    }

    #[test]
    fn test_transport_kinds_have_no_status() {
        assert_eq!(ApiError::Network("refused".into()).status(), None);
        assert_eq!(ApiError::Timeout(Duration::from_secs(30)).kind(), ApiErrorKind::Timeout);
    }
}
