//! Error types for the game API client.
//!
//! Transport-level failures are normalized into `ApiError` at the client
//! boundary. `NotFound`, `ServerError` and `Timeout` carry fixed,
//! user-presentable messages; every other failure keeps the underlying text.
//! Application errors (a 2xx body with an `error` field) are not represented
//! here; see `call_state`.

use thiserror::Error;

/// Errors returned by `GameClient` parsers, `Transport`s and `GameApi`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("Session not found")]
    NotFound,

    /// The server returned a 5xx status.
    #[error("Server error. Please try again later.")]
    ServerError { status: u16 },

    /// The request exceeded the client deadline.
    #[error("Request timed out")]
    Timeout,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS, TLS or protocol failure below HTTP status handling.
    #[error("{0}")]
    Transport(String),

    /// The base URL could not be combined with a session id.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Coarse classification of an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ServerError,
    Timeout,
    Other,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound => ErrorKind::NotFound,
            ApiError::ServerError { .. } => ErrorKind::ServerError,
            ApiError::Timeout => ErrorKind::Timeout,
            _ => ErrorKind::Other,
        }
    }

    /// Map a non-2xx status to its error.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => ApiError::NotFound,
            500..=599 => ApiError::ServerError { status },
            _ => ApiError::Http {
                status,
                body: body.to_string(),
            },
        }
    }
}
