//! Configuration for chart rendering.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Clock used to format time-axis labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelClock {
    /// Wall-clock time in the local timezone
    #[default]
    Local,
    /// Wall-clock time in UTC
    Utc,
}

impl FromStr for LabelClock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(LabelClock::Local),
            "utc" => Ok(LabelClock::Utc),
            _ => Err(format!("Invalid label clock: {}", s)),
        }
    }
}

/// Configuration for per-channel sensor charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// A time label is drawn every `tick_stride` samples
    pub tick_stride: usize,
    /// Channels that get a panel; others are skipped when rendering
    pub channels: Vec<u8>,
    /// Clock used for time labels
    pub label_clock: LabelClock,
    /// Value always included in the vertical range (lower anchor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
    /// Value always included in the vertical range (upper anchor)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 150,
            tick_stride: 20,
            channels: (0..8).collect(),
            label_clock: LabelClock::Local,
            floor: None,
            ceiling: None,
        }
    }
}
