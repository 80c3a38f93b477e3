//! Type definitions for dashboard data structures

use crate::command::CommandState;
use crate::device::DeviceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text shown when the last poll failed
pub const UNKNOWN_STATUS: &str = "?";

/// Status line shown under the controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    /// Current command as text, `?` after a failed poll
    pub text: String,
    /// Reply body of the last `/set_cmd`
    pub last_reply: Option<String>,
    /// Error of the last failed poll
    pub last_error: Option<String>,
    /// Time of the last successful poll
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

impl StatusLine {
    pub(super) fn mark_ok(&mut self, state: CommandState) {
        self.text = state.to_string();
        self.last_error = None;
        self.last_success = Some(Utc::now());
        self.consecutive_failures = 0;
    }

    pub(super) fn mark_failed(&mut self, error: &DeviceError) {
        self.text = UNKNOWN_STATUS.to_string();
        self.last_error = Some(error.to_string());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    pub fn is_failed(&self) -> bool {
        self.consecutive_failures > 0
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            text: UNKNOWN_STATUS.to_string(),
            last_reply: None,
            last_error: None,
            last_success: None,
            consecutive_failures: 0,
        }
    }
}

/// Snapshot of the dashboard for `status --json` and the watch summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub status: String,
    pub command: Option<String>,
    pub last_reply: Option<String>,
    pub last_error: Option<String>,
    /// Latest value per channel
    pub sensors: Vec<f64>,
    /// Samples held per channel
    pub samples: usize,
    pub max_history: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandBits;

    #[test]
    fn test_failure_then_recovery() {
        let mut line = StatusLine::default();
        line.mark_failed(&DeviceError::Timeout(3));
        line.mark_failed(&DeviceError::Timeout(3));
        assert_eq!(line.text, "?");
        assert_eq!(line.consecutive_failures, 2);
        assert!(line.is_failed());

        line.mark_ok(CommandState::Bits(CommandBits::new(4)));
        assert_eq!(line.text, "4 (100)");
        assert!(!line.is_failed());
        assert!(line.last_error.is_none());
        assert!(line.last_success.is_some());
    }
}
