//! Device polling.
//!
//! A background task fetches the device state on a fixed interval, records
//! the readings into the dashboard and redraws the charts. An optional push
//! listener follows `/sse` for actuator changes between ticks.

mod config;
mod push;

pub use config::*;
pub use push::PushListener;

use crate::command::CommandState;
use crate::dashboard::Dashboard;
use crate::device::{DeviceClient, DeviceError};
use crate::history::SensorFrame;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lower bound for the poll period; `tokio::time::interval` rejects zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Capacity of the tick event channel
const EVENT_CAPACITY: usize = 64;

/// Result of one poll tick
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// State and sensors were read and applied
    Updated {
        command: CommandState,
        sensors: SensorFrame,
    },
    /// The device could not be read; the dashboard history is unchanged
    Failed(DeviceError),
}

impl PollOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PollOutcome::Updated { .. })
    }
}

/// Broadcast after every completed tick
#[derive(Debug, Clone)]
pub struct PollEvent {
    /// 1-based tick counter
    pub tick: u64,
    /// Unix epoch milliseconds when the tick completed
    pub timestamp: i64,
    pub outcome: PollOutcome,
}

/// Background service that periodically polls the device.
pub struct Poller {
    client: DeviceClient,
    dashboard: Arc<Dashboard>,
    interval: Duration,
    events: broadcast::Sender<PollEvent>,
}

impl Poller {
    pub fn new(client: DeviceClient, dashboard: Arc<Dashboard>, config: &PollingConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            dashboard,
            interval: config.interval().max(MIN_INTERVAL),
            events,
        }
    }

    /// Receive tick events from a poller that has not been started yet
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    /// Runs one tick: fetch, apply, render.
    ///
    /// Never returns an error. On failure the status line reads `?` and
    /// nothing is recorded.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.fetch().await {
            Ok((command, sensors)) => {
                let timestamp = chrono::Utc::now().timestamp_millis();
                self.dashboard.apply_command(command);
                self.dashboard.apply_sensors(&sensors, timestamp);
                self.dashboard.render_all();

                tracing::debug!(command = %command, "Poll succeeded");
                PollOutcome::Updated { command, sensors }
            }
            Err(error) => {
                tracing::warn!(
                    url = %self.client.base_url(),
                    error = %error,
                    "Poll failed"
                );
                self.dashboard.mark_failed(&error);
                PollOutcome::Failed(error)
            }
        }
    }

    /// Reads everything a tick needs before touching the dashboard
    async fn fetch(&self) -> Result<(CommandState, SensorFrame), DeviceError> {
        let report = self.client.fetch_status().await?;
        let sensors = match report.sensors {
            Some(frame) => frame,
            None => self.client.fetch_sensors().await?,
        };
        Ok((report.command, sensors))
    }

    /// Start the poll loop.
    ///
    /// The first tick fires immediately. Ticks missed while a request was in
    /// flight are skipped.
    pub fn start(self, cancel_token: CancellationToken) -> PollerHandle {
        let (interval_tx, mut interval_rx) = watch::channel(self.interval);
        let events = self.events.clone();
        let cancel = cancel_token.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_ms = self.interval.as_millis() as u64,
                url = %self.client.base_url(),
                "Poller started"
            );

            let mut tick = 0u64;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Poller shutting down");
                        break;
                    }
                    Ok(()) = interval_rx.changed() => {
                        let period = (*interval_rx.borrow_and_update()).max(MIN_INTERVAL);
                        interval = tokio::time::interval_at(
                            tokio::time::Instant::now() + period,
                            period,
                        );
                        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                        tracing::info!(interval_ms = period.as_millis() as u64, "Polling interval changed");
                    }
                    _ = interval.tick() => {
                        let outcome = tokio::select! {
                            _ = cancel.cancelled() => {
                                tracing::info!("Poller shutting down");
                                break;
                            }
                            outcome = self.poll_once() => outcome,
                        };

                        tick += 1;
                        let event = PollEvent {
                            tick,
                            timestamp: chrono::Utc::now().timestamp_millis(),
                            outcome,
                        };
                        // No receivers is fine
                        let _ = self.events.send(event);
                    }
                }
            }
        });

        PollerHandle {
            cancel: cancel_token,
            interval: interval_tx,
            events,
            task,
        }
    }
}

/// Control handle for a running poller.
pub struct PollerHandle {
    cancel: CancellationToken,
    interval: watch::Sender<Duration>,
    events: broadcast::Sender<PollEvent>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Re-arms the poll interval; the next tick fires one period from now
    pub fn set_interval(&self, period: Duration) {
        self.interval.send_replace(period);
    }

    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    /// Cancels the poll loop. An in-flight request is abandoned.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Waits for the poll task to exit
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Poller task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartConfig;
    use crate::device::DeviceConfig;

    fn unreachable_poller(interval_ms: u64) -> Poller {
        let device = DeviceConfig {
            url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
            ..DeviceConfig::default()
        };
        let client = DeviceClient::new(&device).unwrap();
        let dashboard = Arc::new(Dashboard::with_capacity(10, ChartConfig::default()).unwrap());
        let config = PollingConfig {
            interval_ms,
            ..PollingConfig::default()
        };
        Poller::new(client, dashboard, &config)
    }

    #[tokio::test]
    async fn test_poll_once_failure_marks_unknown() {
        let poller = unreachable_poller(1000);
        let outcome = poller.poll_once().await;

        assert!(matches!(outcome, PollOutcome::Failed(_)));
        assert_eq!(poller.dashboard().status().text, "?");
        assert_eq!(poller.dashboard().view().samples, 0);
    }

    #[tokio::test]
    async fn test_zero_interval_is_clamped() {
        let poller = unreachable_poller(0);
        assert_eq!(poller.interval, MIN_INTERVAL);
    }

    #[tokio::test]
    async fn test_start_emits_events_and_stops() {
        let poller = unreachable_poller(50);
        let mut events = poller.subscribe();
        let handle = poller.start(CancellationToken::new());

        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.tick, 1);
        assert!(!event.outcome.is_updated());

        handle.stop();
        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_interval_updates_handle() {
        let poller = unreachable_poller(1000);
        let handle = poller.start(CancellationToken::new());

        handle.set_interval(PollRate::FiveSeconds.duration());
        assert_eq!(handle.interval(), Duration::from_secs(5));

        handle.stop();
        handle.join().await;
    }
}
