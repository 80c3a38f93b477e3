//! Tracing setup
//!
//! Builds the `EnvFilter` from `[logging]` and installs a pretty or JSON
//! formatter. Log output goes to stderr so command output on stdout stays
//! machine-readable.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build filter directives string from LoggingConfig
///
/// Returns the base level followed by one `sensordash::<component>=<level>`
/// directive per configured component.
///
/// # Examples
///
/// ```
/// use sensordash::config::{LogFormat, LoggingConfig};
/// use sensordash::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("poller".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,sensordash::poller=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",sensordash::{}={}", component, level));
        }
    }

    filter_str
}

/// Initialize tracing based on configuration
///
/// `RUST_LOG`, when set, replaces the configured directives.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_build_filter_base_level_only() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(build_filter_directives(&config), "warn");
    }

    #[test]
    fn test_build_filter_components_sorted() {
        let mut levels = HashMap::new();
        levels.insert("simulator".to_string(), "warn".to_string());
        levels.insert("device".to_string(), "trace".to_string());

        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Json,
            component_levels: Some(levels),
        };

        assert_eq!(
            build_filter_directives(&config),
            "info,sensordash::device=trace,sensordash::simulator=warn"
        );
    }
}
