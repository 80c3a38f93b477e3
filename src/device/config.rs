//! Configuration for the device connection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Firmware API revision spoken by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceProtocol {
    /// `/status` returns `{ret_cmd, sensor_data}`; commands are `ret_cmd=<n>`
    #[default]
    Bitmask,
    /// `/status` returns `{door_state, fan_level, light_level}`; sensors come
    /// from `/sensor`; commands are `door=&fan=&light=`
    Levels,
}

impl FromStr for DeviceProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitmask" => Ok(DeviceProtocol::Bitmask),
            "levels" => Ok(DeviceProtocol::Levels),
            _ => Err(format!("Invalid device protocol: {}", s)),
        }
    }
}

/// Connection settings for the device HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Base URL of the device, e.g. `http://192.168.4.1`
    pub url: String,
    /// API revision
    pub protocol: DeviceProtocol,
    /// Timeout for each request
    pub timeout_seconds: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            protocol: DeviceProtocol::Bitmask,
            timeout_seconds: 3,
        }
    }
}
