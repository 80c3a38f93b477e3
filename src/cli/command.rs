//! Toggle and set command implementations

use crate::chart::ChartConfig;
use crate::cli::{load_config_with_overrides, output, status::read_device, SetArgs, ToggleArgs};
use crate::command::{ActuatorLevels, CommandBits, CommandState};
use crate::dashboard::{ChartPanels, Dashboard};
use crate::device::{DeviceClient, DeviceProtocol};
use crate::history::HistoryStore;
use crate::logging::init_tracing;

/// Dashboard for one-shot commands; nothing is charted
fn scratch_dashboard() -> Dashboard {
    Dashboard::new(HistoryStore::default(), ChartConfig::default(), ChartPanels::unbound())
}

/// POST `state` and record the reply
async fn send(
    client: &DeviceClient,
    dashboard: &Dashboard,
    state: CommandState,
) -> Result<String, Box<dyn std::error::Error>> {
    let form = state.form();
    let reply = client.set_command(&state).await?;
    dashboard.record_reply(reply.clone());
    Ok(output::format_command_reply(&form, &reply))
}

/// Handle `sensordash toggle` command
///
/// Reads the current state first, so the flip applies to what the device
/// reports rather than a stale cache.
pub async fn handle_toggle(args: &ToggleArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.device)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let client = DeviceClient::new(&config.device)?;
    let dashboard = scratch_dashboard();
    read_device(&client, &dashboard).await?;

    let state = dashboard
        .toggle(args.actuator)
        .ok_or("device state unknown")?;
    tracing::info!(actuator = %args.actuator, command = %state, "Toggling actuator");

    send(&client, &dashboard, state).await
}

/// Handle `sensordash set` command
pub async fn handle_set(args: &SetArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.device)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let client = DeviceClient::new(&config.device)?;
    let dashboard = scratch_dashboard();

    let state = match (client.protocol(), args.ret_cmd) {
        (DeviceProtocol::Bitmask, Some(ret_cmd)) => CommandState::Bits(CommandBits::new(ret_cmd)),
        (DeviceProtocol::Bitmask, None) => {
            return Err("--ret-cmd is required for bitmask devices".into());
        }
        (DeviceProtocol::Levels, Some(_)) => {
            return Err("--ret-cmd is not supported by levels devices; use --door/--fan/--light".into());
        }
        (DeviceProtocol::Levels, None) => {
            if args.door.is_none() && args.fan.is_none() && args.light.is_none() {
                return Err("at least one of --door, --fan or --light is required".into());
            }
            // Unspecified levels keep their current value
            let current = match read_device(&client, &dashboard).await?.command {
                CommandState::Levels(levels) => levels,
                CommandState::Bits(_) => ActuatorLevels::default(),
            };
            CommandState::Levels(ActuatorLevels {
                door: args.door.unwrap_or(current.door),
                fan: args.fan.unwrap_or(current.fan),
                light: args.light.unwrap_or(current.light),
            })
        }
    };

    send(&client, &dashboard, state).await
}
