//! Logging initialization with environment-based formatters.
//!
//! - Production (`REGIMELAB_ENV=production` or `prod`): JSON lines
//! - Anything else: colorful, human-readable output
//!
//! Filtering follows `RUST_LOG`, defaulting to `info`. Logs go to stderr so
//! command output on stdout stays machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the log format.
pub const ENV_VAR: &str = "REGIMELAB_ENV";

pub fn is_production(env: &str) -> bool {
    matches!(env.trim().to_ascii_lowercase().as_str(), "production" | "prod")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging() {
    let env = std::env::var(ENV_VAR).unwrap_or_default();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if is_production(&env) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!("logging already initialized: {e}");
    }
}
