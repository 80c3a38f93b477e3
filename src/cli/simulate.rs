//! Simulate command implementation

use crate::cli::{shutdown_signal, SimulateArgs};
use crate::config::DashConfig;
use crate::logging::init_tracing;
use crate::simulator;
use tokio_util::sync::CancellationToken;

/// Load configuration with simulator overrides
pub fn load_simulator_config(
    args: &SimulateArgs,
) -> Result<DashConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        DashConfig::load(Some(&args.config))?
    } else {
        DashConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref host) = args.host {
        config.simulator.host = host.clone();
    }
    if let Some(port) = args.port {
        config.simulator.port = port;
    }
    if let Some(protocol) = args.protocol {
        config.simulator.protocol = protocol;
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

/// Handle `sensordash simulate` command
pub async fn run_simulate(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_simulator_config(&args)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let listener = tokio::net::TcpListener::bind(config.simulator.bind_addr()).await?;
    let cancel_token = CancellationToken::new();
    let signal = tokio::spawn(shutdown_signal(cancel_token.clone()));

    simulator::serve(listener, &config.simulator, cancel_token.clone()).await?;

    cancel_token.cancel();
    signal.await?;
    tracing::info!("Device simulator stopped");
    Ok(())
}
