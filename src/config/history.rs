//! Sensor history configuration

use crate::history::DEFAULT_MAX_HISTORY;
use serde::{Deserialize, Serialize};

/// Retention of the rolling sensor history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Samples kept per channel
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}
