//! Device simulator
//!
//! Serves the device's HTTP surface so the dashboard can run without
//! hardware:
//!
//! - `GET /status`, `GET /sensor`
//! - `POST /set_cmd` with the firmware's `No data` / `Invalid value` replies
//! - `GET /sse` pushing actuator changes, limited to `max_sse_clients`
//!
//! Sensor values follow a deterministic waveform refreshed on an interval.

mod config;
mod handlers;
mod state;

pub use config::SimulatorConfig;
pub use state::{waveform, CommandRejection, SimState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the simulator router.
pub fn create_router(state: Arc<SimState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(handlers::status))
        .route("/sensor", get(handlers::sensor))
        .route("/set_cmd", post(handlers::set_cmd))
        .route("/sse", get(handlers::sse))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Refresh sensor values every `period` until cancelled.
pub fn start_sensor_refresh(
    state: Arc<SimState>,
    period: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    tracing::debug!("Sensor refresh stopped");
                    break;
                }
                _ = interval.tick() => state.refresh_sensors(),
            }
        }
    })
}

/// Serve the simulator on `listener` until `cancel_token` fires.
pub async fn serve(
    listener: TcpListener,
    config: &SimulatorConfig,
    cancel_token: CancellationToken,
) -> std::io::Result<()> {
    let state = Arc::new(
        SimState::new(config.protocol, config.max_sse_clients).with_shutdown(cancel_token.clone()),
    );
    let refresh = start_sensor_refresh(
        Arc::clone(&state),
        config.refresh_interval(),
        cancel_token.clone(),
    );

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(
            addr = %addr,
            protocol = ?config.protocol,
            "Device simulator listening"
        );
    }

    let shutdown = cancel_token.clone();
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    cancel_token.cancel();
    if let Err(e) = refresh.await {
        tracing::error!(error = %e, "Sensor refresh task panicked");
    }
    Ok(())
}
