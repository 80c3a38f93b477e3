//! Configuration for the device simulator.

use crate::device::DeviceProtocol;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for `sensordash simulate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub host: String,
    pub port: u16,
    /// API revision to emulate
    pub protocol: DeviceProtocol,
    /// Milliseconds between sensor value refreshes
    pub sensor_refresh_ms: u64,
    /// Concurrent `/sse` subscribers; further clients get 503
    pub max_sse_clients: usize,
}

impl SimulatorConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_refresh_ms)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            protocol: DeviceProtocol::Bitmask,
            sensor_refresh_ms: 1000,
            max_sse_clients: 4,
        }
    }
}
