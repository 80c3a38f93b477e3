//! Device HTTP client.
//!
//! Typed access to the device endpoints:
//!
//! - `GET /status`: actuator state, plus sensors in the bitmask revision
//! - `GET /sensor`: sensor readings
//! - `POST /set_cmd`: URL-encoded actuator command, answered with a plain-text body
//! - `GET /sse`: server-sent events carrying `{ret_cmd}` updates

mod config;
mod error;
pub mod parser;
pub mod sse;

pub use config::*;
pub use error::*;
pub use parser::StatusReport;

use crate::command::CommandState;
use crate::history::SensorFrame;
use futures::{Stream, StreamExt};
use sse::SseDecoder;
use std::time::Duration;

/// HTTP client bound to a single device.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    /// HTTP client with connection pooling
    client: reqwest::Client,
    /// Client for long-lived `/sse` streams (connect timeout only)
    stream_client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    protocol: DeviceProtocol,
    timeout_seconds: u64,
}

impl DeviceClient {
    /// Create a client for the configured device.
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceError::ConnectionFailed(e.to_string()))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DeviceError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            stream_client,
            ..Self::with_client(config, client)
        })
    }

    /// Create a client with a custom HTTP client (for testing).
    pub fn with_client(config: &DeviceConfig, client: reqwest::Client) -> Self {
        Self {
            stream_client: client.clone(),
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            protocol: config.protocol,
            timeout_seconds: config.timeout_seconds,
        }
    }

    pub fn protocol(&self) -> DeviceProtocol {
        self.protocol
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str) -> Result<String, DeviceError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| DeviceError::classify(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            return Err(DeviceError::HttpError(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| DeviceError::classify(e, self.timeout_seconds))
    }

    /// Fetch `/status`.
    pub async fn fetch_status(&self) -> Result<StatusReport, DeviceError> {
        let body = self.get_text("/status").await?;
        parser::parse_status(&body, self.protocol)
    }

    /// Fetch `/sensor`.
    pub async fn fetch_sensors(&self) -> Result<SensorFrame, DeviceError> {
        let body = self.get_text("/sensor").await?;
        parser::parse_sensors(&body)
    }

    /// POST a command to `/set_cmd`, returning the device's reply verbatim.
    pub async fn set_command(&self, state: &CommandState) -> Result<String, DeviceError> {
        let form = state.form();
        tracing::debug!(command = %form.describe(), "Sending command");

        let response = self
            .client
            .post(self.url("/set_cmd"))
            .form(&form)
            .send()
            .await
            .map_err(|e| DeviceError::classify(e, self.timeout_seconds))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeviceError::classify(e, self.timeout_seconds))?;

        if !status.is_success() {
            tracing::warn!(status = %status, body = %body, "Device rejected command");
            return Err(DeviceError::HttpError(status.as_u16()));
        }

        Ok(body)
    }

    /// Subscribe to `/sse` push updates.
    ///
    /// Yields one command state per event. Events that fail to parse are
    /// logged and skipped; a transport error is yielded once and ends the
    /// stream.
    pub fn subscribe(&self) -> impl Stream<Item = Result<CommandState, DeviceError>> + Send + 'static {
        let request = self
            .stream_client
            .get(self.url("/sse"))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let protocol = self.protocol;
        let timeout_seconds = self.timeout_seconds;

        async_stream::stream! {
            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    yield Err(DeviceError::classify(e, timeout_seconds));
                    return;
                }
            };

            if !response.status().is_success() {
                yield Err(DeviceError::HttpError(response.status().as_u16()));
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = byte_stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        for data in decoder.feed(&bytes) {
                            match parser::parse_push_event(&data, protocol) {
                                Ok(state) => yield Ok(state),
                                Err(e) => {
                                    tracing::warn!(error = %e, data = %data, "Skipping malformed push event");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(DeviceError::classify(e, timeout_seconds));
                        return;
                    }
                }
            }
        }
    }
}
