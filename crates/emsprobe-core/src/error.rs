//! Shared error type across emsprobe crates.

use thiserror::Error;

use crate::log::SequenceId;

/// Stable error codes (printed by the CLI, asserted by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Text is not a JSON object.
    Parse,
    /// Send attempted without an open connection.
    NotConnected,
    /// Underlying connection failure.
    Transport,
    /// No open transition or no response within bound.
    Timeout,
    /// Unknown or stale log id.
    NotFound,
    /// Invalid configuration or fixture file.
    BadConfig,
    /// Internal invariant broken (closed channel).
    Internal,
}

impl ErrorCode {
    /// String representation used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Parse => "PARSE_ERROR",
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::Transport => "TRANSPORT_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("connection not open")]
    NotConnected,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("log entry {0} not found")]
    NotFound(SequenceId),
    #[error("bad config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ProbeError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ProbeError::Parse(_) => ErrorCode::Parse,
            ProbeError::NotConnected => ErrorCode::NotConnected,
            ProbeError::Transport(_) => ErrorCode::Transport,
            ProbeError::Timeout(_) => ErrorCode::Timeout,
            ProbeError::NotFound(_) => ErrorCode::NotFound,
            ProbeError::Config(_) => ErrorCode::BadConfig,
            ProbeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
