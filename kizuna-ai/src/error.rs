//! Error types for the collaborator clients.

use thiserror::Error;

use kizuna_core::collab::CollabError;

/// Errors from the HTTP-backed collaborator clients.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Response body could not be parsed.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Service is unreachable or refused the connection.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts exhausted.
    #[error("all {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The last error observed.
        last_error: String,
    },

    /// Client configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout(0)
        } else if err.is_connect() {
            AiError::Unavailable(err.to_string())
        } else {
            AiError::RequestFailed(err.to_string())
        }
    }
}

impl From<AiError> for CollabError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::ParseError(msg) => CollabError::InvalidResponse(msg),
            other => CollabError::Unavailable(other.to_string()),
        }
    }
}
