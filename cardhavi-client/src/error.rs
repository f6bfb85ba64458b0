//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate resource (e.g. email already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cache file could not be read or written
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),
}

impl ClientError {
    /// Server unreachable (connect failure or timeout); the only case where
    /// cached data may stand in for a server answer
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_connect() || e.is_timeout())
    }

    /// The request never reached the server (connect failure); safe to resend
    /// a non-idempotent call. A timeout may have been processed already.
    pub fn is_unsent(&self) -> bool {
        matches!(self, ClientError::Http(e) if e.is_connect())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
