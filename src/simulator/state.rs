//! Simulated device state.

use crate::command::{ActuatorLevels, CommandBits, CommandState, COMMAND_MASK};
use crate::device::DeviceProtocol;
use crate::history::CHANNEL_COUNT;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{watch, Semaphore};
use tokio_util::sync::CancellationToken;

/// Reasons `/set_cmd` rejects a body. The messages are the response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandRejection {
    #[error("No data")]
    Empty,
    #[error("Invalid value")]
    InvalidValue,
}

/// Sensor value of `channel` after `elapsed_secs`, within `0..=100`.
///
/// Each channel gets its own phase and speed so the charts differ.
pub fn waveform(channel: usize, elapsed_secs: f64) -> f64 {
    let phase = channel as f64 * 0.7;
    let speed = 0.15 + channel as f64 * 0.05;
    let value = 50.0
        + 45.0 * (elapsed_secs * speed + phase).sin()
        + 4.0 * (elapsed_secs * 1.3 + phase).sin();
    (value.clamp(0.0, 100.0) * 1000.0).round() / 1000.0
}

fn form_value<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
}

/// State shared by the simulator's handlers.
pub struct SimState {
    protocol: DeviceProtocol,
    command: watch::Sender<CommandState>,
    sensors: RwLock<[f64; CHANNEL_COUNT]>,
    sse_slots: Arc<Semaphore>,
    /// Ends open push streams so graceful shutdown can finish
    shutdown: CancellationToken,
    started: Instant,
}

impl SimState {
    pub fn new(protocol: DeviceProtocol, max_sse_clients: usize) -> Self {
        let initial = match protocol {
            DeviceProtocol::Bitmask => CommandState::Bits(CommandBits::default()),
            DeviceProtocol::Levels => CommandState::Levels(ActuatorLevels::default()),
        };
        let (command, _) = watch::channel(initial);
        let sensors = std::array::from_fn(|i| waveform(i, 0.0));

        Self {
            protocol,
            command,
            sensors: RwLock::new(sensors),
            sse_slots: Arc::new(Semaphore::new(max_sse_clients)),
            shutdown: CancellationToken::new(),
            started: Instant::now(),
        }
    }

    /// Ties open push streams to `token`
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn protocol(&self) -> DeviceProtocol {
        self.protocol
    }

    pub fn command(&self) -> CommandState {
        *self.command.borrow()
    }

    /// Receiver notified on every command change
    pub fn watch_command(&self) -> watch::Receiver<CommandState> {
        self.command.subscribe()
    }

    pub fn sensors(&self) -> [f64; CHANNEL_COUNT] {
        *self.sensors.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Advances every channel along its waveform
    pub fn refresh_sensors(&self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut sensors = self.sensors.write().unwrap_or_else(|e| e.into_inner());
        for (i, value) in sensors.iter_mut().enumerate() {
            *value = waveform(i, elapsed);
        }
    }

    pub(super) fn sse_slots(&self) -> Arc<Semaphore> {
        Arc::clone(&self.sse_slots)
    }

    pub(super) fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Applies a URL-encoded `/set_cmd` body
    pub fn apply_form(&self, body: &str) -> Result<CommandState, CommandRejection> {
        if body.trim().is_empty() {
            return Err(CommandRejection::Empty);
        }

        let next = match self.command() {
            CommandState::Bits(_) => {
                let raw: i64 = form_value(body, "ret_cmd")
                    .and_then(|v| v.parse().ok())
                    .ok_or(CommandRejection::InvalidValue)?;
                if !(0..=i64::from(COMMAND_MASK)).contains(&raw) {
                    return Err(CommandRejection::InvalidValue);
                }
                CommandState::Bits(CommandBits::new(raw as u8))
            }
            CommandState::Levels(current) => CommandState::Levels(Self::parse_levels(body, current)?),
        };

        self.command.send_if_modified(|state| {
            let changed = *state != next;
            *state = next;
            changed
        });
        Ok(next)
    }

    fn parse_levels(body: &str, current: ActuatorLevels) -> Result<ActuatorLevels, CommandRejection> {
        let door = form_value(body, "door");
        let fan = form_value(body, "fan");
        let light = form_value(body, "light");
        if door.is_none() && fan.is_none() && light.is_none() {
            return Err(CommandRejection::InvalidValue);
        }

        let level = |v: Option<&str>, fallback: u8| match v {
            Some(v) => v.parse::<u8>().map_err(|_| CommandRejection::InvalidValue),
            None => Ok(fallback),
        };
        let door = match door {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(_) => return Err(CommandRejection::InvalidValue),
            None => current.door,
        };

        Ok(ActuatorLevels {
            door,
            fan: level(fan, current.fan)?,
            light: level(light, current.light)?,
        })
    }
}
