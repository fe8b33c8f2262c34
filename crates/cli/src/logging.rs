//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so command output on stdout stays clean.
//!
//! - no `-v`: `RUST_LOG` if set, otherwise warnings only
//! - `-v`: info (dispatched intents)
//! - `-vv`: debug (state transitions)
//! - `-vvv`: trace

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level directive for a `-v` count
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter; explicit `-v` flags win over `RUST_LOG`
pub fn env_filter(verbosity: u8) -> EnvFilter {
    let level = level_for_verbosity(verbosity);
    if verbosity == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

/// Install the global subscriber
pub fn init_logging(verbosity: u8, with_ansi: bool) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(with_ansi)
                .with_target(false),
        )
        .try_init()
        .context("failed to initialize logging")
}
