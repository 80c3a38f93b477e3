//! `/sse` push listener.

use super::config::PollingConfig;
use crate::dashboard::Dashboard;
use crate::device::DeviceClient;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Follows the device's push stream and applies each actuator update.
///
/// Reconnects after `reconnect_ms` whenever the stream ends or fails.
pub struct PushListener {
    client: DeviceClient,
    dashboard: Arc<Dashboard>,
    reconnect_delay: Duration,
}

impl PushListener {
    pub fn new(client: DeviceClient, dashboard: Arc<Dashboard>, config: &PollingConfig) -> Self {
        Self {
            client,
            dashboard,
            reconnect_delay: config.reconnect_delay(),
        }
    }

    /// Start the listener task. Returns when `cancel_token` fires.
    pub fn start(self, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(url = %self.client.base_url(), "Push listener started");

            loop {
                let stream = self.client.subscribe();
                futures::pin_mut!(stream);

                loop {
                    tokio::select! {
                        _ = cancel_token.cancelled() => {
                            tracing::info!("Push listener shutting down");
                            return;
                        }
                        item = stream.next() => match item {
                            Some(Ok(state)) => {
                                tracing::debug!(command = %state, "Push update");
                                self.dashboard.apply_command(state);
                            }
                            Some(Err(e)) => {
                                tracing::warn!(error = %e, "Push stream failed");
                                break;
                            }
                            None => {
                                tracing::debug!("Push stream ended");
                                break;
                            }
                        }
                    }
                }

                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("Push listener shutting down");
                        return;
                    }
                    _ = tokio::time::sleep(self.reconnect_delay) => {
                        tracing::debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "Reconnecting push stream");
                    }
                }
            }
        })
    }
}
