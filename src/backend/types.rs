//! Backend types — wire shapes, errors, and the backend trait.
//!
//! The controller only talks to `DelayBackend`, so tests can swap in an
//! in-memory backend while the binary uses the reqwest client.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while talking to the delay backend.
///
/// Every variant collapses to `Offline` in the view; the distinction exists
/// for logs only.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A configuration value could not be parsed or is out of bounds.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The HTTP request could not be sent or its body not read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend returned a non-success HTTP status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not `{"delay": <number>}`.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Request body for `POST /api/delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayRequest {
    pub delay: u32,
}

/// Response body for both `GET` and `POST /api/delay`.
#[derive(Debug, Deserialize)]
pub(crate) struct DelayResponse {
    pub delay: serde_json::Number,
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// The single REST resource holding the delay. Values returned are raw
/// backend values; callers clamp them.
#[async_trait::async_trait]
pub trait DelayBackend: Send + Sync {
    /// Read the stored delay.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] on network failure, non-2xx status, or a
    /// malformed body.
    async fn get_delay(&self) -> Result<i64, SyncError>;

    /// Store a delay and return the value the backend actually applied.
    ///
    /// # Errors
    ///
    /// Same as [`DelayBackend::get_delay`].
    async fn post_delay(&self, delay: u32) -> Result<i64, SyncError>;
}
