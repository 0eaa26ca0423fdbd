//! Adapter error taxonomy.
//!
//! Operational failures throw; parse-time ambiguity (foreign comments,
//! stale anchors) stays `Option`-shaped in the codecs and never reaches
//! this type.

use thiserror::Error;

/// Error for storage adapter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// No bearer credential available. The caller must re-authenticate;
    /// retrying as-is cannot succeed.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("thread {id:?} not found")]
    ThreadNotFound { id: String },

    #[error("comment {id:?} not found")]
    CommentNotFound { id: String },

    /// Non-success HTTP status from the backing API. No automatic
    /// retry; the caller decides.
    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },

    /// Network or decoding failure before a status was available.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// A record that should round-trip through the thread codec did not.
    #[error("malformed thread record: {message}")]
    MalformedRecord { message: String },
}

impl AdapterError {
    /// Whether a caller could reasonably retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::RequestFailed { status } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_server_errors_are_retryable() {
        assert!(AdapterError::Transport {
            message: "connection reset".to_string()
        }
        .is_retryable());
        assert!(AdapterError::RequestFailed { status: 503 }.is_retryable());
    }

    #[test]
    fn precondition_failures_are_not_retryable() {
        assert!(!AdapterError::NotAuthenticated.is_retryable());
        assert!(!AdapterError::RequestFailed { status: 404 }.is_retryable());
        assert!(!AdapterError::ThreadNotFound {
            id: "42".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn messages_are_descriptive() {
        let err = AdapterError::CommentNotFound {
            id: "5-1".to_string(),
        };
        assert_eq!(err.to_string(), "comment \"5-1\" not found");
    }
}
