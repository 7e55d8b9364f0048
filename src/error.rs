use serde::Deserialize;
use thiserror::Error;

pub const SECURITY_MESSAGE: &str =
    "Security validation failed. Please refresh the page and try again.";
pub const NO_SCOPE_MESSAGE: &str = "No event selected. Please close and reopen the guest manager.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewError {
    /// Rejected before any request was issued.
    #[error("{0}")]
    Validation(String),
    #[error("{}", SECURITY_MESSAGE)]
    Security,
    #[error("{}", NO_SCOPE_MESSAGE)]
    NoScope,
    #[error("Your session has expired. Redirecting to login...")]
    Unauthorized,
    #[error("Access denied. You don't have permission for this action.")]
    Forbidden,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{0}")]
    InvalidState(String),
}

impl ViewError {
    /// Message shown to the user; transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ViewError::Network(_) => {
                "Unable to reach the server. Please check your internet connection and try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// JSON error body sent by the API on failure. `code` is the structured
/// variant; older endpoints only send `error` text.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_falls_back_when_missing() {
        let body = ErrorBody::parse(r#"{"detail":"x"}"#).unwrap();
        assert_eq!(body.message_or("Failed to add guest"), "Failed to add guest");
        assert!(ErrorBody::parse("<html>oops</html>").is_none());
    }

    #[test]
    fn network_errors_hide_transport_detail() {
        let err = ViewError::Network("connection refused (os error 111)".into());
        assert!(!err.user_message().contains("os error"));
    }
}
