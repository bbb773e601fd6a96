//! Resilient HTTP client for the Yookye backend.
//!
//! Wraps outbound calls with bearer-token injection, a single transparent
//! refresh-and-retry cycle on 401, and uniform success/error unwrapping.

mod client;

pub use client::ApiClient;

use thiserror::Error;

/// Convenience alias for client call results.
pub type ApiResult<T> = Result<T, ApiError>;

/// API call failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request produced no response at all.
    #[error("Network error: {0}")]
    Network(String),

    /// A 401 that survived the one refresh-and-retry cycle. The token
    /// pair has already been cleared when this is returned.
    #[error("Authentication required")]
    AuthRequired,

    /// Non-2xx response, carrying the server's `error`/`message` field
    /// when one was supplied.
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),
}

impl ApiError {
    /// Whether this failure means the user must log in again.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ApiError::AuthRequired)
    }
}
