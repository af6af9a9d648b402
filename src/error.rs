use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the coaching client.
///
/// Every variant is non-fatal to the process. Callers decide whether a
/// failure forces the session back to Idle or is only logged.
#[derive(Debug, Error)]
pub enum CoachError {
    /// A required endpoint or token is not configured
    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    /// Backend answered with a non-success status
    #[error("{operation} API error {status}: {body}")]
    Http {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Request never produced a response (connect, DNS, body read)
    #[error("{operation} request failed: {message}")]
    Network {
        operation: &'static str,
        message: String,
    },

    /// Success status but the body is unusable
    #[error("{operation} returned a malformed response: {message}")]
    MalformedResponse {
        operation: &'static str,
        message: String,
    },

    /// No speech capture or synthesis available in this runtime
    #[error("{0}")]
    CapabilityUnavailable(String),

    /// Caller input rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// Session identifier absent when one is required
    #[error("No live session available. Please restart the listening session.")]
    SessionLost,

    /// Session start abandoned by a stop before the backend answered
    #[error("session start was cancelled")]
    StartCancelled,

    /// Action not allowed from the current lifecycle stage
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl CoachError {
    pub(crate) fn network(operation: &'static str, err: impl std::fmt::Display) -> Self {
        CoachError::Network {
            operation,
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(operation: &'static str, message: impl Into<String>) -> Self {
        CoachError::MalformedResponse {
            operation,
            message: message.into(),
        }
    }
}

/// Engine-level speech capture failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("recognition engine already started")]
    AlreadyStarted,

    #[error("recognition engine error: {0}")]
    Engine(String),
}

pub type Result<T, E = CoachError> = std::result::Result<T, E>;
