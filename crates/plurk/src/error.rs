//! Error types for the Plurk API client.

use thiserror::Error;

/// Errors returned by the Plurk client.
#[derive(Error, Debug)]
pub enum PlurkError {
    /// Connection failure, timeout, or an unreadable response body.
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered but signaled an application-level failure.
    #[error("API error ({status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Error message from the API (`error_text`) or a decode failure.
        message: String,
    },

    /// The service rejected the credentials at login.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message from the API.
        message: String,
    },

    /// The operation needs a logged-in session and there is none.
    #[error("Login required")]
    AuthRequired,

    /// The service rejected the operation parameters.
    #[error("Invalid parameters: {message}")]
    Validation {
        /// Error message from the API, or the local reason.
        message: String,
    },

    /// The referenced plurk or user does not exist or is not visible.
    #[error("Not found: {message}")]
    NotFound {
        /// Error message from the API.
        message: String,
    },

    /// A permalink did not have the expected `/p/<token>` shape.
    #[error("Malformed permalink {input:?}: {reason}")]
    Parse {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Invalid client configuration.
    #[error("Config error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

impl PlurkError {
    /// Whether repeating the same call unchanged may succeed.
    ///
    /// Only transport-level failures qualify; every other variant needs the
    /// caller to change its input or session first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlurkError::Network(_))
    }

    /// HTTP status attached to the failure, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlurkError::Remote { status, .. } => Some(*status),
            PlurkError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        PlurkError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Map a failed API answer to the matching variant.
    ///
    /// `login` is set for the login endpoint, where a rejection means bad
    /// credentials rather than a missing session.
    pub(crate) fn classify(status: u16, message: String, login: bool) -> Self {
        let lower = message.to_ascii_lowercase();
        if login && (lower.contains("invalid login") || status == 401 || status == 403) {
            return PlurkError::Authentication { message };
        }
        if lower.contains("requires login") {
            return PlurkError::AuthRequired;
        }
        if status == 404 || lower.contains("not found") || lower.contains("no permissions") {
            return PlurkError::NotFound { message };
        }
        if lower.starts_with("invalid")
            || lower.contains("qualifier")
            || lower.contains("lang")
            || lower.contains("content is empty")
        {
            return PlurkError::Validation { message };
        }
        PlurkError::Remote { status, message }
    }
}

/// Result type for Plurk operations.
pub type Result<T> = std::result::Result<T, PlurkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_login_rejection() {
        let err = PlurkError::classify(400, "Invalid login".to_string(), true);
        assert!(matches!(err, PlurkError::Authentication { .. }));
    }

    #[test]
    fn classify_invalid_login_outside_login_is_validation() {
        let err = PlurkError::classify(400, "Invalid login".to_string(), false);
        assert!(matches!(err, PlurkError::Validation { .. }));
    }

    #[test]
    fn classify_requires_login() {
        let err = PlurkError::classify(400, "Requires login".to_string(), false);
        assert!(matches!(err, PlurkError::AuthRequired));
    }

    #[test]
    fn classify_not_found() {
        assert!(matches!(
            PlurkError::classify(400, "Plurk not found".to_string(), false),
            PlurkError::NotFound { .. }
        ));
        assert!(matches!(
            PlurkError::classify(404, "gone".to_string(), false),
            PlurkError::NotFound { .. }
        ));
        assert!(matches!(
            PlurkError::classify(400, "No permissions".to_string(), false),
            PlurkError::NotFound { .. }
        ));
    }

    #[test]
    fn classify_validation() {
        assert!(matches!(
            PlurkError::classify(400, "Invalid data".to_string(), false),
            PlurkError::Validation { .. }
        ));
        assert!(matches!(
            PlurkError::classify(400, "Unknown qualifier".to_string(), false),
            PlurkError::Validation { .. }
        ));
    }

    #[test]
    fn classify_everything_else_is_remote() {
        let err = PlurkError::classify(500, "Internal Server Error".to_string(), false);
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_retryable());
        assert!(matches!(err, PlurkError::Remote { status: 500, .. }));
    }
}
