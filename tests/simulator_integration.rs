//! Integration tests for the device simulator router and a client round trip.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use sensordash::command::{Actuator, CommandBits, CommandState};
use sensordash::device::DeviceProtocol;
use sensordash::poller::{Poller, PollingConfig};
use sensordash::simulator::{create_router, SimState};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

async fn body_text(response: axum::response::Response) -> String {
    let bytes: Vec<u8> = response
        .into_body()
        .into_data_stream()
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .filter_map(|chunk| chunk.ok())
        .flat_map(|chunk| chunk.to_vec())
        .collect();
    String::from_utf8(bytes).unwrap()
}

fn set_cmd(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/set_cmd")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_status_shape_and_headers() {
    let mut app = create_router(Arc::new(SimState::new(DeviceProtocol::Bitmask, 4)));

    let response = app.call(get("/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["cache-control"], "no-cache");
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ret_cmd"], 0);
    let sensors = json["sensor_data"].as_array().unwrap();
    assert_eq!(sensors.len(), 8);
    for value in sensors {
        let v = value.as_f64().unwrap();
        assert!((0.0..=100.0).contains(&v));
    }
}

#[tokio::test]
async fn test_set_cmd_rejects_out_of_range_then_accepts() {
    let mut app = create_router(Arc::new(SimState::new(DeviceProtocol::Bitmask, 4)));

    let response = app.call(set_cmd("ret_cmd=8")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid value");

    let response = app.call(set_cmd("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "No data");

    let response = app.call(set_cmd("ret_cmd=5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");

    let response = app.call(get("/status")).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ret_cmd"], 5);
}

#[tokio::test]
async fn test_levels_status_and_sensor() {
    let mut app = create_router(Arc::new(SimState::new(DeviceProtocol::Levels, 4)));

    let response = app.call(set_cmd("door=1&light=40")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.call(get("/status")).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["door_state"], true);
    assert_eq!(json["fan_level"], 0);
    assert_eq!(json["light_level"], 40);
    assert!(json.get("sensor_data").is_none());

    let response = app.call(get("/sensor")).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["sensor_data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_sse_client_limit() {
    let state = Arc::new(SimState::new(DeviceProtocol::Bitmask, 1));
    let mut app = create_router(Arc::clone(&state));

    let first = app.call(get("/sse")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.call(get("/sse")).await.unwrap();
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Dropping the first stream frees its slot
    drop(first);
    let third = app.call(get("/sse")).await.unwrap();
    assert_eq!(third.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_client_toggle_round_trip() {
    let (url, state, cancel) = common::spawn_simulator(DeviceProtocol::Bitmask, 4).await;
    let client = common::make_client(&url, DeviceProtocol::Bitmask);
    let dashboard = common::make_dashboard();
    let poller = Poller::new(client.clone(), dashboard.clone(), &PollingConfig::default());

    assert!(poller.poll_once().await.is_updated());
    assert_eq!(dashboard.command(), Some(CommandState::Bits(CommandBits::new(0))));

    let toggled = dashboard.toggle(Actuator::Door).unwrap();
    assert_eq!(client.set_command(&toggled).await.unwrap(), "OK");
    assert_eq!(state.command(), CommandState::Bits(CommandBits::new(0b100)));

    assert!(poller.poll_once().await.is_updated());
    assert_eq!(dashboard.command(), Some(toggled));

    cancel.cancel();
}

#[tokio::test]
async fn test_push_stream_reports_changes() {
    let (url, state, cancel) = common::spawn_simulator(DeviceProtocol::Bitmask, 4).await;
    let client = common::make_client(&url, DeviceProtocol::Bitmask);

    let stream = client.subscribe();
    futures::pin_mut!(stream);

    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(first, CommandState::Bits(CommandBits::new(0)));

    state.apply_form("ret_cmd=3").unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(next, CommandState::Bits(CommandBits::new(3)));

    cancel.cancel();
}
