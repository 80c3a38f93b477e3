//! Status command implementation

use crate::cli::{load_config_with_overrides, output, StatusArgs};
use crate::dashboard::Dashboard;
use crate::device::{DeviceClient, StatusReport};
use crate::logging::init_tracing;

/// Read the device once into a fresh dashboard
pub async fn read_device(
    client: &DeviceClient,
    dashboard: &Dashboard,
) -> Result<StatusReport, Box<dyn std::error::Error>> {
    let report = client.fetch_status().await?;
    let timestamp = chrono::Utc::now().timestamp_millis();
    dashboard.apply_status(&report, timestamp);

    if report.sensors.is_none() {
        let sensors = client.fetch_sensors().await?;
        dashboard.apply_sensors(&sensors, timestamp);
    }

    Ok(report)
}

/// Handle `sensordash status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.device)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let client = DeviceClient::new(&config.device)?;
    let dashboard = Dashboard::with_capacity(config.history.max_history, config.chart.clone())?;
    read_device(&client, &dashboard).await?;

    let view = dashboard.view();
    if args.json {
        Ok(output::format_status_json(&view)?)
    } else {
        Ok(output::format_status_table(&view, client.base_url()))
    }
}
