//! Centralised tracing initialisation for RAISE binaries.
//!
//! Log lines go to stderr so command output on stdout stays machine
//! readable. `RUST_LOG` overrides the configured default level.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Subscriber settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Emit newline-delimited JSON instead of human-readable lines.
    pub json: bool,
    /// Default verbosity when `RUST_LOG` is not set.
    pub level: Level,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::WARN,
        }
    }
}

impl TelemetryConfig {
    /// Map CLI verbosity flags to a level: quiet wins, then verbose.
    pub fn from_flags(json: bool, verbose: bool, quiet: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else if verbose {
            Level::DEBUG
        } else {
            Level::WARN
        };
        Self { json, level }
    }
}

/// Initialise the global tracing subscriber.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing(config: TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .ok();
    }
}
