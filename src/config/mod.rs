//! Configuration module for sensordash
//!
//! Layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SENSORDASH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use sensordash::config::DashConfig;
//!
//! let toml = r#"
//! [device]
//! url = "http://192.168.4.1"
//!
//! [polling]
//! interval_ms = 2000
//! "#;
//! let config: DashConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.polling.interval_ms, 2000);
//! assert_eq!(config.history.max_history, 100);
//! ```

pub mod error;
pub mod history;
pub mod logging;

pub use error::ConfigError;
pub use history::HistoryConfig;
pub use logging::{LogFormat, LoggingConfig};

pub use crate::chart::{ChartConfig, LabelClock};
pub use crate::device::{DeviceConfig, DeviceProtocol};
pub use crate::poller::{PollingConfig, UpdateMode};
pub use crate::simulator::SimulatorConfig;

use crate::history::CHANNEL_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the dashboard and the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashConfig {
    /// Device connection
    pub device: DeviceConfig,
    /// Poll loop and push updates
    pub polling: PollingConfig,
    /// Rolling sensor history
    pub history: HistoryConfig,
    /// Chart panels
    pub chart: ChartConfig,
    /// Device simulator
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

impl DashConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `SENSORDASH_*` environment variable overrides
    ///
    /// Invalid values are ignored and the previous value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SENSORDASH_DEVICE_URL") {
            self.device.url = url;
        }
        if let Ok(protocol) = std::env::var("SENSORDASH_DEVICE_PROTOCOL") {
            if let Ok(p) = protocol.parse() {
                self.device.protocol = p;
            }
        }
        if let Ok(interval) = std::env::var("SENSORDASH_POLL_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                self.polling.interval_ms = ms;
            }
        }
        if let Ok(max) = std::env::var("SENSORDASH_MAX_HISTORY") {
            if let Ok(n) = max.parse() {
                self.history.max_history = n;
            }
        }

        if let Ok(level) = std::env::var("SENSORDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SENSORDASH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match reqwest::Url::parse(&self.device.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::invalid(
                    "device.url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ))
            }
            Err(e) => return Err(ConfigError::invalid("device.url", e.to_string())),
        }
        if self.device.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "device.timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        if self.polling.interval_ms == 0 {
            return Err(ConfigError::invalid(
                "polling.interval_ms",
                "interval must be non-zero",
            ));
        }

        if self.history.max_history == 0 {
            return Err(ConfigError::invalid(
                "history.max_history",
                "history must retain at least one sample",
            ));
        }

        if let Some(ch) = self
            .chart
            .channels
            .iter()
            .find(|ch| usize::from(**ch) >= CHANNEL_COUNT)
        {
            return Err(ConfigError::invalid(
                "chart.channels",
                format!("channel {} out of range 0..{}", ch, CHANNEL_COUNT),
            ));
        }
        if self.chart.tick_stride == 0 {
            return Err(ConfigError::invalid(
                "chart.tick_stride",
                "stride must be non-zero",
            ));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::invalid(
                "chart.width",
                "chart dimensions must be non-zero",
            ));
        }

        if self.simulator.max_sse_clients == 0 {
            return Err(ConfigError::invalid(
                "simulator.max_sse_clients",
                "at least one push client must be allowed",
            ));
        }

        Ok(())
    }
}
