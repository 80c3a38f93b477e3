//! Shared test utilities for sensordash integration tests.

#![allow(dead_code)]

use sensordash::chart::ChartConfig;
use sensordash::dashboard::Dashboard;
use sensordash::device::{DeviceClient, DeviceConfig, DeviceProtocol};
use sensordash::simulator::{create_router, SimState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Bitmask `/status` body with the given command and sensor values
pub fn bitmask_status(ret_cmd: u8, sensors: [f64; 8]) -> serde_json::Value {
    serde_json::json!({
        "ret_cmd": ret_cmd,
        "sensor_data": sensors,
    })
}

/// Client for a device at `url`
pub fn make_client(url: &str, protocol: DeviceProtocol) -> DeviceClient {
    let config = DeviceConfig {
        url: url.to_string(),
        protocol,
        timeout_seconds: 2,
    };
    DeviceClient::new(&config).unwrap()
}

/// Dashboard with the default 100-sample history and all panels bound
pub fn make_dashboard() -> Arc<Dashboard> {
    Arc::new(Dashboard::with_capacity(100, ChartConfig::default()).unwrap())
}

/// Serve a simulator on an ephemeral port.
///
/// Returns the base URL, the shared state and the token that stops it.
pub async fn spawn_simulator(
    protocol: DeviceProtocol,
    max_sse_clients: usize,
) -> (String, Arc<SimState>, CancellationToken) {
    let cancel = CancellationToken::new();
    let state = Arc::new(SimState::new(protocol, max_sse_clients).with_shutdown(cancel.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let app = create_router(Arc::clone(&state));
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .unwrap();
    });

    (format!("http://{}", addr), state, cancel)
}
