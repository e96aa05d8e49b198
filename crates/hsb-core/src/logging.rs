use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the bot.
///
/// `default_level` applies to our crates when `RUST_LOG` is unset; everything
/// else stays at `warn`.
pub fn init(service_name: &str, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,hsb_core={default_level},hsb_practicum={default_level},hsb_telegram={default_level},{service_name}={default_level}"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialise logging: {e}")))
}
