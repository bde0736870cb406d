//! Logging initialization for bingo.
//!
//! Logs always go to stderr so stdout stays clean for command output.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor `--debug` is given
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Pick the filter directive: `RUST_LOG` wins, then `--debug`, then the default
pub fn log_directive(rust_log: Option<String>, debug_override: bool) -> String {
    match rust_log.filter(|v| !v.is_empty()) {
        Some(directive) => directive,
        None if debug_override => "debug".to_string(),
        None => DEFAULT_LOG_LEVEL.to_string(),
    }
}

/// Initialize the global subscriber.
///
/// # Arguments
/// * `debug_override` - If true, log at "debug" unless `RUST_LOG` is set (from --debug flag)
pub fn init_logging(debug_override: bool) -> Result<()> {
    let directive = log_directive(std::env::var("RUST_LOG").ok(), debug_override);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", directive, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
