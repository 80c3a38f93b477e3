//! Configuration for device polling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How actuator state updates reach the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Interval polling only
    #[default]
    Poll,
    /// Interval polling plus the `/sse` push stream
    Sse,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poll" => Ok(UpdateMode::Poll),
            "sse" => Ok(UpdateMode::Sse),
            _ => Err(format!("Invalid update mode: {}", s)),
        }
    }
}

/// Polling rates offered by the rate selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollRate {
    OneSecond,
    TwoSeconds,
    FiveSeconds,
}

impl PollRate {
    pub fn all() -> [PollRate; 3] {
        [PollRate::OneSecond, PollRate::TwoSeconds, PollRate::FiveSeconds]
    }

    pub fn as_millis(self) -> u64 {
        match self {
            PollRate::OneSecond => 1000,
            PollRate::TwoSeconds => 2000,
            PollRate::FiveSeconds => 5000,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }
}

impl FromStr for PollRate {
    type Err = String;

    /// Accepts `1s`, `2s`, `5s` or the bare millisecond value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1s" | "1000" => Ok(PollRate::OneSecond),
            "2s" | "2000" => Ok(PollRate::TwoSeconds),
            "5s" | "5000" => Ok(PollRate::FiveSeconds),
            _ => {
                let presets: Vec<String> = PollRate::all().iter().map(|r| r.to_string()).collect();
                Err(format!(
                    "Invalid poll rate: {} (expected one of {})",
                    s,
                    presets.join(", ")
                ))
            }
        }
    }
}

impl fmt::Display for PollRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_millis() / 1000)
    }
}

/// Configuration for the poll loop and push listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Milliseconds between poll ticks
    pub interval_ms: u64,
    /// Whether to also follow `/sse`
    pub updates: UpdateMode,
    /// Delay before re-subscribing after the push stream drops
    pub reconnect_ms: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: PollRate::OneSecond.as_millis(),
            updates: UpdateMode::Poll,
            reconnect_ms: 2000,
        }
    }
}
