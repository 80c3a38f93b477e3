//! HTTP handlers for the simulated device.

use super::state::SimState;
use crate::command::CommandState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

/// Actuator fields as reported by `/status` and `/sse`
fn command_json(command: CommandState) -> Value {
    match command {
        CommandState::Bits(bits) => json!({ "ret_cmd": bits.raw() }),
        CommandState::Levels(levels) => json!({
            "door_state": levels.door,
            "fan_level": levels.fan,
            "light_level": levels.light,
        }),
    }
}

/// GET /status
pub async fn status(State(state): State<Arc<SimState>>) -> Response {
    let mut body = command_json(state.command());
    if let (CommandState::Bits(_), Some(map)) = (state.command(), body.as_object_mut()) {
        map.insert("sensor_data".to_string(), json!(state.sensors()));
    }

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        Json(body),
    )
        .into_response()
}

/// GET /sensor
pub async fn sensor(State(state): State<Arc<SimState>>) -> Response {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(json!({ "sensor_data": state.sensors() })),
    )
        .into_response()
}

/// POST /set_cmd
pub async fn set_cmd(State(state): State<Arc<SimState>>, body: String) -> Response {
    match state.apply_form(&body) {
        Ok(command) => {
            tracing::info!(command = %command, "Command applied");
            (StatusCode::OK, "OK").into_response()
        }
        Err(rejection) => {
            tracing::warn!(body = %body, reason = %rejection, "Command rejected");
            (StatusCode::BAD_REQUEST, rejection.to_string()).into_response()
        }
    }
}

/// GET /sse
///
/// Sends the current state, then one event per change.
pub async fn sse(State(state): State<Arc<SimState>>) -> Response {
    let Ok(permit) = state.sse_slots().try_acquire_owned() else {
        tracing::warn!("Rejecting push subscriber, all slots in use");
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many clients").into_response();
    };

    let mut rx = state.watch_command();
    let shutdown = state.shutdown();
    tracing::debug!("Push subscriber connected");

    let stream = async_stream::stream! {
        let _permit = permit;
        loop {
            let command = *rx.borrow_and_update();
            yield Ok::<_, Infallible>(Event::default().data(command_json(command).to_string()));

            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }
    };

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("keep-alive"),
        )
        .into_response()
}
