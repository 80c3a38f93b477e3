//! Error types for device requests.

use thiserror::Error;

/// Errors that can occur while talking to the device.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Body could not be read or decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl DeviceError {
    /// Classify a reqwest error.
    pub(crate) fn classify(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            DeviceError::Timeout(timeout_seconds)
        } else if e.is_decode() || e.is_body() {
            DeviceError::InvalidResponse(e.to_string())
        } else {
            DeviceError::ConnectionFailed(e.to_string())
        }
    }
}
