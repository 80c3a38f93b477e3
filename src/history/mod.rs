//! Rolling sensor history
//!
//! Maintains one fixed-capacity FIFO buffer of samples per sensor channel.
//! Appends past capacity evict the oldest sample, so each buffer always holds
//! the most recent `max_history` readings in chronological order.

mod types;

pub use types::*;

use std::collections::VecDeque;
use thiserror::Error;

/// Errors raised when constructing a history store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history capacity must be greater than zero")]
    ZeroCapacity,
}

/// Bounded sample buffer for a single channel
#[derive(Debug, Clone)]
struct ChannelHistory {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl ChannelHistory {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting from the front until within capacity
    fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Samples oldest first
    fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }
}

/// Per-channel rolling history for all sensor channels.
///
/// Constructed once per session and handed by reference to the chart
/// renderer.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    channels: Vec<ChannelHistory>,
    max_history: usize,
}

impl HistoryStore {
    /// Creates an empty store retaining `max_history` samples per channel
    pub fn new(max_history: usize) -> Result<Self, HistoryError> {
        if max_history == 0 {
            return Err(HistoryError::ZeroCapacity);
        }

        Ok(Self {
            channels: (0..CHANNEL_COUNT)
                .map(|_| ChannelHistory::with_capacity(max_history))
                .collect(),
            max_history,
        })
    }

    /// Records a reading for one channel.
    ///
    /// Non-finite values are stored as zero.
    pub fn record(&mut self, channel: Channel, value: f64, timestamp: i64) {
        let value = sanitize(Some(value));
        self.channels[channel.index()].push(Sample { value, timestamp });
    }

    /// Records one reading per channel, all sharing `timestamp`
    pub fn record_frame(&mut self, frame: &SensorFrame, timestamp: i64) {
        for channel in Channel::all() {
            self.record(channel, frame.value(channel), timestamp);
        }
    }

    /// Returns the samples of a channel, oldest first
    pub fn snapshot(&self, channel: Channel) -> Vec<Sample> {
        self.channels[channel.index()].iter().copied().collect()
    }

    pub fn latest(&self, channel: Channel) -> Option<Sample> {
        self.channels[channel.index()].latest()
    }

    pub fn len(&self, channel: Channel) -> usize {
        self.channels[channel.index()].len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self {
            channels: (0..CHANNEL_COUNT)
                .map(|_| ChannelHistory::with_capacity(DEFAULT_MAX_HISTORY))
                .collect(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
