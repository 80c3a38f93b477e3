//! Dashboard state
//!
//! Owns everything a running dashboard mutates:
//! - the rolling sensor history
//! - the cached actuator state (the device remains the source of truth)
//! - the status line shown to the user
//! - the chart panels bound at start-up
//!
//! Every lock is held only for a synchronous section; nothing here awaits.

mod panels;
mod types;

pub use panels::ChartPanels;
pub use types::{DashboardView, StatusLine, UNKNOWN_STATUS};

use crate::chart::{ChartConfig, ChartFrame, ChartRenderer};
use crate::command::{Actuator, CommandState};
use crate::device::{DeviceError, StatusReport};
use crate::history::{Channel, HistoryError, HistoryStore, Sample, SensorFrame, CHANNEL_COUNT};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Shared dashboard state, handed to the poller, push listener and CLI.
pub struct Dashboard {
    history: RwLock<HistoryStore>,
    command: RwLock<Option<CommandState>>,
    status: RwLock<StatusLine>,
    panels: Mutex<ChartPanels>,
    renderer: ChartRenderer,
}

impl Dashboard {
    /// Creates a dashboard with the given history store and chart panels
    pub fn new(history: HistoryStore, chart: ChartConfig, panels: ChartPanels) -> Self {
        Self {
            history: RwLock::new(history),
            command: RwLock::new(None),
            status: RwLock::new(StatusLine::default()),
            panels: Mutex::new(panels),
            renderer: ChartRenderer::new(chart),
        }
    }

    /// Creates a dashboard with one panel per configured chart channel
    pub fn with_capacity(max_history: usize, chart: ChartConfig) -> Result<Self, HistoryError> {
        let history = HistoryStore::new(max_history)?;
        let panels = ChartPanels::bind(&chart);
        Ok(Self::new(history, chart, panels))
    }

    /// Applies a successful `/status` read.
    ///
    /// Replaces the cached command and records one sample per channel. A
    /// report without sensor readings records zeros.
    pub fn apply_status(&self, report: &StatusReport, timestamp: i64) {
        self.apply_command(report.command);
        if let Some(frame) = &report.sensors {
            self.apply_sensors(frame, timestamp);
        }
    }

    /// Records one sample per channel
    pub fn apply_sensors(&self, frame: &SensorFrame, timestamp: i64) {
        self.history
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .record_frame(frame, timestamp);
    }

    /// Replaces the cached command state and marks the poll as successful
    pub fn apply_command(&self, state: CommandState) {
        *self.command.write().unwrap_or_else(|e| e.into_inner()) = Some(state);
        self.status
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .mark_ok(state);
    }

    /// Records a failed poll. History is left untouched.
    pub fn mark_failed(&self, error: &DeviceError) {
        self.status
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .mark_failed(error);
    }

    /// Stores the device's reply to the last command
    pub fn record_reply(&self, reply: String) {
        self.status.write().unwrap_or_else(|e| e.into_inner()).last_reply = Some(reply);
    }

    /// Speculatively toggles an actuator in the cached state.
    ///
    /// Returns the new state, or None when no state has been read yet.
    pub fn toggle(&self, actuator: Actuator) -> Option<CommandState> {
        let mut command = self.command.write().unwrap_or_else(|e| e.into_inner());
        let toggled = command.map(|state| state.toggled(actuator))?;
        *command = Some(toggled);
        Some(toggled)
    }

    pub fn command(&self) -> Option<CommandState> {
        *self.command.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> StatusLine {
        self.status.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn snapshot(&self, channel: Channel) -> Vec<Sample> {
        self.history
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot(channel)
    }

    /// Most recent value per channel, zero when empty
    pub fn latest_values(&self) -> [f64; CHANNEL_COUNT] {
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());
        let mut values = [0.0; CHANNEL_COUNT];
        for channel in Channel::all() {
            values[channel.index()] = history.latest(channel).map(|s| s.value).unwrap_or(0.0);
        }
        values
    }

    /// Chart geometry for a channel's bound panel
    pub fn frame(&self, channel: Channel) -> Option<ChartFrame> {
        // Lock order: history, then panels
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());
        let panels = self.panels.lock().unwrap_or_else(|e| e.into_inner());
        let canvas = panels.get(channel)?;
        Some(self.renderer.frame(
            channel,
            &history,
            embedded_graphics::prelude::Size::new(canvas.width(), canvas.height()),
        ))
    }

    /// Redraws every bound panel
    pub fn render_all(&self) {
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());
        self.panels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .render_all(&self.renderer, &history);
    }

    /// Writes every bound panel as `sensor<n>.ppm` under `dir`
    pub fn save_charts(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        self.panels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .save_all(dir)
    }

    /// Serializable summary for CLI output
    pub fn view(&self) -> DashboardView {
        let status = self.status();
        let command = self.command();
        let sensors = self.latest_values().to_vec();
        let history = self.history.read().unwrap_or_else(|e| e.into_inner());

        DashboardView {
            status: status.text,
            command: command.map(|c| c.to_string()),
            last_reply: status.last_reply,
            last_error: status.last_error,
            sensors,
            samples: Channel::all().map(|c| history.len(c)).max().unwrap_or(0),
            max_history: history.max_history(),
        }
    }
}
