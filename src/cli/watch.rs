//! Watch command implementation

use crate::chart::format_time_label;
use crate::cli::{load_config_with_overrides, output, shutdown_signal, WatchArgs};
use crate::config::{DashConfig, UpdateMode};
use crate::dashboard::Dashboard;
use crate::device::DeviceClient;
use crate::logging::init_tracing;
use crate::poller::{Poller, PushListener};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Load configuration with watch-specific overrides
pub fn load_watch_config(args: &WatchArgs) -> Result<DashConfig, Box<dyn std::error::Error>> {
    let mut config = load_config_with_overrides(&args.device)?;
    if let Some(interval_ms) = args.interval_ms {
        config.polling.interval_ms = interval_ms;
    }
    if let Some(rate) = args.rate {
        config.polling.interval_ms = rate.as_millis();
    }
    if args.sse {
        config.polling.updates = UpdateMode::Sse;
    }
    Ok(config)
}

/// Handle `sensordash watch` command
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_watch_config(&args)?;
    config.validate()?;
    init_tracing(&config.logging)?;

    tracing::debug!(?config, "Loaded configuration");

    let client = DeviceClient::new(&config.device)?;
    let dashboard = Arc::new(Dashboard::with_capacity(
        config.history.max_history,
        config.chart.clone(),
    )?);

    let cancel_token = CancellationToken::new();
    let poller = Poller::new(client.clone(), Arc::clone(&dashboard), &config.polling);
    let mut events = poller.subscribe();
    let poller_handle = poller.start(cancel_token.clone());

    let push_handle = match config.polling.updates {
        UpdateMode::Sse => {
            tracing::info!("Following device push updates");
            let listener = PushListener::new(client.clone(), Arc::clone(&dashboard), &config.polling);
            Some(listener.start(cancel_token.clone()))
        }
        UpdateMode::Poll => None,
    };

    let signal = tokio::spawn(shutdown_signal(cancel_token.clone()));
    let mut result: Result<(), Box<dyn std::error::Error>> = Ok(());

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    let label = format_time_label(event.timestamp, config.chart.label_clock);
                    println!("{}", output::format_tick(&event, &label));

                    if let Some(ref dir) = args.out_dir {
                        if let Err(e) = dashboard.save_charts(dir) {
                            result = Err(e.into());
                            break;
                        }
                    }

                    if args.ticks.is_some_and(|n| event.tick >= n) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Output fell behind the poller");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    cancel_token.cancel();
    poller_handle.join().await;
    if let Some(handle) = push_handle {
        handle.await?;
    }
    signal.await?;

    if let Some(ref dir) = args.out_dir {
        tracing::info!(dir = %dir.display(), "Charts written");
    }
    result
}
