//! CLI module for sensordash
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `watch` - Poll the device, print each tick and optionally write charts
//! - `status` - One-shot read of actuator state and sensors
//! - `toggle` - Flip one actuator
//! - `set` - Send an explicit command
//! - `simulate` - Run the device simulator
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Terminal 1: fake device
//! sensordash simulate --port 8080
//!
//! # Terminal 2: watch it every 2s, writing charts to ./charts
//! sensordash watch --url http://127.0.0.1:8080 --interval-ms 2000 --out-dir charts
//!
//! sensordash toggle light
//! ```

pub mod command;
pub mod completions;
pub mod config;
pub mod output;
pub mod simulate;
pub mod status;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::command::Actuator;
use crate::config::DashConfig;
use crate::device::DeviceProtocol;
use crate::poller::PollRate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// sensordash - dashboard for a door/fan/light sensor device
#[derive(Parser, Debug)]
#[command(
    name = "sensordash",
    version,
    about = "Poll, chart and control a small door/fan/light sensor device"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the device continuously
    Watch(WatchArgs),
    /// Read the device once
    Status(StatusArgs),
    /// Toggle an actuator
    Toggle(ToggleArgs),
    /// Send an explicit command
    Set(SetArgs),
    /// Run the device simulator
    Simulate(SimulateArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to a device
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensordash.toml")]
    pub config: PathBuf,

    /// Device base URL (e.g., http://192.168.4.1)
    #[arg(short, long, env = "SENSORDASH_DEVICE_URL")]
    pub url: Option<String>,

    /// Device API revision (bitmask, levels)
    #[arg(short, long)]
    pub protocol: Option<DeviceProtocol>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SENSORDASH_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Milliseconds between polls
    #[arg(short, long, env = "SENSORDASH_POLL_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Preset poll rate (1s, 2s or 5s); takes precedence over --interval-ms
    #[arg(short, long)]
    pub rate: Option<PollRate>,

    /// Also follow the device's /sse push stream
    #[arg(long)]
    pub sse: bool,

    /// Write sensor<n>.ppm charts to this directory after every tick
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(short, long)]
    pub ticks: Option<u64>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Actuator to flip (light, fan, door)
    pub actuator: Actuator,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Raw 3-bit command word (bitmask devices)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7), conflicts_with_all = ["door", "fan", "light"])]
    pub ret_cmd: Option<u8>,

    /// Door open (levels devices)
    #[arg(long)]
    pub door: Option<bool>,

    /// Fan level 0-255 (levels devices)
    #[arg(long)]
    pub fan: Option<u8>,

    /// Light level 0-255 (levels devices)
    #[arg(long)]
    pub light: Option<u8>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensordash.toml")]
    pub config: PathBuf,

    /// Override listen host
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Override listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// API revision to emulate (bitmask, levels)
    #[arg(short, long)]
    pub protocol: Option<DeviceProtocol>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SENSORDASH_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "sensordash.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides
///
/// A missing file falls back to defaults; a malformed one is an error.
pub fn load_config_with_overrides(
    args: &DeviceArgs,
) -> Result<DashConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        DashConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        DashConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.url {
        config.device.url = url.clone();
    }
    if let Some(protocol) = args.protocol {
        config.device.protocol = protocol;
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => return,
    }

    cancel_token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_watch_defaults() {
        let cli = Cli::try_parse_from(["sensordash", "watch"]).unwrap();
        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.device.config, PathBuf::from("sensordash.toml"));
                assert!(!args.sse);
                assert!(args.out_dir.is_none());
                assert!(args.ticks.is_none());
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_watch_with_options() {
        let cli = Cli::try_parse_from([
            "sensordash",
            "watch",
            "--url",
            "http://10.0.0.2",
            "--interval-ms",
            "5000",
            "--sse",
            "--ticks",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.device.url.as_deref(), Some("http://10.0.0.2"));
                assert_eq!(args.interval_ms, Some(5000));
                assert!(args.sse);
                assert_eq!(args.ticks, Some(3));
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_watch_rate() {
        let cli = Cli::try_parse_from(["sensordash", "watch", "--rate", "2s"]).unwrap();
        match cli.command {
            Commands::Watch(args) => assert_eq!(args.rate, Some(PollRate::TwoSeconds)),
            _ => panic!("Expected Watch command"),
        }

        let result = Cli::try_parse_from(["sensordash", "watch", "--rate", "3s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_toggle() {
        let cli = Cli::try_parse_from(["sensordash", "toggle", "fan"]).unwrap();
        match cli.command {
            Commands::Toggle(args) => assert_eq!(args.actuator, Actuator::Fan),
            _ => panic!("Expected Toggle command"),
        }
    }

    #[test]
    fn test_cli_parse_toggle_unknown_actuator() {
        assert!(Cli::try_parse_from(["sensordash", "toggle", "heater"]).is_err());
    }

    #[test]
    fn test_cli_parse_set_ret_cmd_range() {
        let cli = Cli::try_parse_from(["sensordash", "set", "--ret-cmd", "5"]).unwrap();
        match cli.command {
            Commands::Set(args) => assert_eq!(args.ret_cmd, Some(5)),
            _ => panic!("Expected Set command"),
        }

        assert!(Cli::try_parse_from(["sensordash", "set", "--ret-cmd", "8"]).is_err());
    }

    #[test]
    fn test_cli_parse_set_conflicts() {
        let result =
            Cli::try_parse_from(["sensordash", "set", "--ret-cmd", "1", "--fan", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_set_levels() {
        let cli = Cli::try_parse_from([
            "sensordash", "set", "--door", "true", "--fan", "200",
        ])
        .unwrap();
        match cli.command {
            Commands::Set(args) => {
                assert_eq!(args.door, Some(true));
                assert_eq!(args.fan, Some(200));
                assert!(args.light.is_none());
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_cli_parse_simulate() {
        let cli = Cli::try_parse_from([
            "sensordash", "simulate", "-P", "9090", "--protocol", "levels",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.port, Some(9090));
                assert_eq!(args.protocol, Some(DeviceProtocol::Levels));
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_parse_status_json() {
        let cli = Cli::try_parse_from(["sensordash", "status", "--json"]).unwrap();
        match cli.command {
            Commands::Status(args) => assert!(args.json),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_load_config_cli_overrides_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[device]\nurl = \"http://file-host\"\nprotocol = \"levels\"",
        )
        .unwrap();

        let args = DeviceArgs {
            config: temp.path().to_path_buf(),
            url: Some("http://cli-host".to_string()),
            protocol: None,
            log_level: Some("debug".to_string()),
        };
        let config = load_config_with_overrides(&args).unwrap();

        assert_eq!(config.device.url, "http://cli-host");
        assert_eq!(config.device.protocol, DeviceProtocol::Levels);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let args = DeviceArgs {
            config: PathBuf::from("/nonexistent/sensordash.toml"),
            url: None,
            protocol: None,
            log_level: None,
        };
        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.history.max_history, 100);
    }
}
