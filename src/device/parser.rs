//! Response parsing for the device API revisions.
//!
//! Only a body that is not JSON at all is an error. A wrong or missing field
//! degrades to a default: sensors read as zero, levels as off.

use super::config::DeviceProtocol;
use super::error::DeviceError;
use crate::command::{ActuatorLevels, CommandBits, CommandState};
use crate::history::{SensorFrame, CHANNEL_COUNT};
use serde_json::Value;

/// Decoded `/status` response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub command: CommandState,
    /// Sensor readings carried by the status payload (bitmask revision only)
    pub sensors: Option<SensorFrame>,
}

fn parse_json(body: &str) -> Result<Value, DeviceError> {
    serde_json::from_str(body).map_err(|e| DeviceError::InvalidResponse(e.to_string()))
}

/// Parse a `/status` body for the given protocol revision.
pub fn parse_status(body: &str, protocol: DeviceProtocol) -> Result<StatusReport, DeviceError> {
    let json = parse_json(body)?;
    Ok(status_from_value(&json, protocol))
}

fn status_from_value(json: &Value, protocol: DeviceProtocol) -> StatusReport {
    match protocol {
        DeviceProtocol::Bitmask => StatusReport {
            command: CommandState::Bits(parse_ret_cmd(json)),
            sensors: Some(parse_sensor_data(json)),
        },
        DeviceProtocol::Levels => StatusReport {
            command: CommandState::Levels(parse_levels(json)),
            sensors: None,
        },
    }
}

/// Parse a `/sensor` body.
pub fn parse_sensors(body: &str) -> Result<SensorFrame, DeviceError> {
    let json = parse_json(body)?;
    Ok(parse_sensor_data(&json))
}

/// Parse the JSON payload of one `/sse` event.
pub fn parse_push_event(data: &str, protocol: DeviceProtocol) -> Result<CommandState, DeviceError> {
    let json = parse_json(data)?;
    Ok(status_from_value(&json, protocol).command)
}

fn parse_ret_cmd(json: &Value) -> CommandBits {
    let raw = json
        .get("ret_cmd")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    CommandBits::new((raw & 0xFF) as u8)
}

fn parse_levels(json: &Value) -> ActuatorLevels {
    let door = match json.get("door_state") {
        Some(Value::Bool(b)) => *b,
        Some(v) => v.as_u64().is_some_and(|n| n != 0),
        None => false,
    };
    let level = |key: &str| {
        json.get(key)
            .and_then(Value::as_f64)
            .map(|v| v.clamp(0.0, 255.0) as u8)
            .unwrap_or(0)
    };

    ActuatorLevels {
        door,
        fan: level("fan_level"),
        light: level("light_level"),
    }
}

fn parse_sensor_data(json: &Value) -> SensorFrame {
    let mut frame = SensorFrame::empty();
    if let Some(values) = json.get("sensor_data").and_then(Value::as_array) {
        for (slot, value) in frame.values.iter_mut().zip(values.iter().take(CHANNEL_COUNT)) {
            *slot = value.as_f64();
        }
    }
    frame
}
