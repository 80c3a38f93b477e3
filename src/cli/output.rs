//! Output formatting helpers for CLI commands

use crate::command::SetCommandForm;
use crate::dashboard::{DashboardView, UNKNOWN_STATUS};
use crate::history::CHANNEL_COUNT;
use crate::poller::{PollEvent, PollOutcome};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

fn colored_status(status: &str) -> String {
    if status == UNKNOWN_STATUS {
        status.red().to_string()
    } else {
        status.green().to_string()
    }
}

/// Format a dashboard snapshot as a table
pub fn format_status_table(view: &DashboardView, url: &str) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Channel", "Latest"]);

    for (i, value) in view.sensors.iter().enumerate().take(CHANNEL_COUNT) {
        table.add_row(vec![
            Cell::new(format!("Sensor {}", i)),
            Cell::new(format!("{:.2}", value)),
        ]);
    }

    let mut out = format!("Device:  {}\nCommand: {}\n", url, colored_status(&view.status));
    if let Some(ref error) = view.last_error {
        out.push_str(&format!("Error:   {}\n", error.red()));
    }
    out.push_str(&table.to_string());
    out
}

/// Format a dashboard snapshot as JSON
pub fn format_status_json(view: &DashboardView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

/// One line per poll tick
pub fn format_tick(event: &PollEvent, label: &str) -> String {
    match &event.outcome {
        PollOutcome::Updated { command, sensors } => {
            let values: Vec<String> = crate::history::Channel::all()
                .map(|c| format!("{:6.2}", sensors.value(c)))
                .collect();
            format!(
                "[{:>4}] {} {} | {}",
                event.tick,
                label.dimmed(),
                command.to_string().green(),
                values.join(" ")
            )
        }
        PollOutcome::Failed(error) => format!(
            "[{:>4}] {} {} | {}",
            event.tick,
            label.dimmed(),
            UNKNOWN_STATUS.red(),
            error.to_string().red()
        ),
    }
}

/// Result line after a command POST, e.g. `Set ret_cmd to 5: OK`
pub fn format_command_reply(form: &SetCommandForm, reply: &str) -> String {
    format!("Set {}: {}", form.describe(), reply.trim())
}
