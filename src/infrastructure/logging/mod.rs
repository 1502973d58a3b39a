// Logging module - Diagnostic logging infrastructure
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::io::{self, IsTerminal};

/// Initialize logging system
///
/// Diagnostics go to stderr; stdout carries reporter lines only.
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(log_level: &str, verbose: bool) -> bool {
    let level = if verbose { "debug" } else { log_level };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cmdlog={},warn", level)));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(true)
                .with_level(true)
                .with_file(verbose)
                .with_line_number(verbose)
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Cmdlog logging system initialized");
    }
    installed
}
