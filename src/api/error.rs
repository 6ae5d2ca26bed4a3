//! Error types surfaced by the API client.
//!
//! An expired access token (first 401) never reaches callers: the client
//! refreshes and retries. What does reach them is either [`ApiError::AuthInvalid`]
//! (the refresh itself failed and the session is gone) or
//! [`ApiError::RequestFailed`] (any other error status, including a second 401).

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::StoreError;

/// Why a token refresh failed. `Clone` because every request waiting on the
/// same refresh receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error("refresh rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("no access token in refresh response")]
    MissingAccessToken,
    #[error("refresh request failed: {0}")]
    Transport(String),
    #[error("session store unavailable: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed ({status}): {message}")]
    RequestFailed { status: StatusCode, message: String },

    #[error("session expired: {0}")]
    AuthInvalid(#[from] RefreshError),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("{0}")]
    Invalid(String),

    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// HTTP status for errors that carry one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the error ended the session (refresh failed, user must sign in).
    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, ApiError::AuthInvalid(_))
    }
}

/// Pick a human message from an error body: the JSON `message` field when
/// present, otherwise the raw text, otherwise the status reason.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<super::types::ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
            return message;
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"message":"Name taken"}"#);
        assert_eq!(msg, "Name taken");
    }

    #[test]
    fn test_error_message_falls_back_to_text_then_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"success":false}"#),
            r#"{"success":false}"#
        );
    }

    #[test]
    fn test_status_accessor() {
        let err = ApiError::RequestFailed {
            status: StatusCode::CONFLICT,
            message: "exists".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert!(!err.is_auth_invalid());
        assert!(ApiError::from(RefreshError::MissingRefreshToken).is_auth_invalid());
    }
}
