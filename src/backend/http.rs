//! reqwest client for `/api/delay`.
//!
//! Thin HTTP wrapper around the one resource. Pure parsing in
//! `parse_delay_body` for testability.

use std::time::Duration;

use super::types::{DelayBackend, DelayRequest, DelayResponse, SyncError};

pub const DELAY_PATH: &str = "/api/delay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpDelayBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpDelayBackend {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| SyncError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: delay_endpoint(base_url) })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read_delay(response: reqwest::Response) -> Result<i64, SyncError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(SyncError::Status { status: status.as_u16(), body: text });
        }

        parse_delay_body(&text)
    }
}

#[async_trait::async_trait]
impl DelayBackend for HttpDelayBackend {
    async fn get_delay(&self) -> Result<i64, SyncError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        Self::read_delay(response).await
    }

    async fn post_delay(&self, delay: u32) -> Result<i64, SyncError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&DelayRequest { delay })
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        Self::read_delay(response).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn delay_endpoint(base_url: &str) -> String {
    format!("{}{DELAY_PATH}", base_url.trim_end_matches('/'))
}

/// Parse `{"delay": <number>}`. Fractional values are rounded to the nearest
/// millisecond.
pub(crate) fn parse_delay_body(json: &str) -> Result<i64, SyncError> {
    let body: DelayResponse = serde_json::from_str(json).map_err(|e| SyncError::Parse(e.to_string()))?;

    if let Some(v) = body.delay.as_i64() {
        return Ok(v);
    }
    let Some(v) = body.delay.as_f64() else {
        return Err(SyncError::Parse(format!("delay is not representable: {}", body.delay)));
    };
    #[allow(clippy::cast_possible_truncation)]
    let rounded = v.round() as i64;
    Ok(rounded)
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
