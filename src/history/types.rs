//! Type definitions for sensor history

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of sensor channels exposed by the device.
pub const CHANNEL_COUNT: usize = 8;

/// Default number of samples retained per channel.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// A single recorded sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sensor value
    pub value: f64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Validated sensor channel index (0..8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    /// Returns the channel for `index`, or None when out of range.
    pub fn new(index: usize) -> Option<Self> {
        (index < CHANNEL_COUNT).then_some(Self(index as u8))
    }

    /// Zero-based channel index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All channels in ascending order
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..CHANNEL_COUNT as u8).map(Channel)
    }
}

impl TryFrom<u8> for Channel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Channel::new(value as usize)
            .ok_or_else(|| format!("channel {} out of range (0-{})", value, CHANNEL_COUNT - 1))
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One reading per channel, as delivered by a single poll.
///
/// Missing entries are `None` and are recorded as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorFrame {
    pub values: [Option<f64>; CHANNEL_COUNT],
}

impl SensorFrame {
    /// Frame with every channel missing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frame with every channel present
    pub fn from_values(values: [f64; CHANNEL_COUNT]) -> Self {
        Self {
            values: values.map(Some),
        }
    }

    /// Value for a channel with the zero-default applied
    pub fn value(&self, channel: Channel) -> f64 {
        sanitize(self.values[channel.index()])
    }
}

/// Applies the degrade-to-zero policy: missing and non-finite values become 0.
pub fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
