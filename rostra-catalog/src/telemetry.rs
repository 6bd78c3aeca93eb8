//! Logging setup.

use rostra_core::ConfigError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset and verbose output was requested.
pub const VERBOSE_FILTER: &str = "rostra=debug,warn";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `verbose`. Call once at startup;
/// a second call fails because a subscriber is already set.
pub fn init_tracing(verbose: bool) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(verbose))
        .try_init()
        .map_err(|e| ConfigError::Telemetry {
            reason: e.to_string(),
        })?;

    tracing::debug!(verbose, "logging initialized");
    Ok(())
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}
