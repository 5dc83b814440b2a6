//! Logging utilities
//!
//! Provides logging configuration for the harness.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize the logger.
///
/// Quiet by default so the progress bar and report stay the only
/// human-facing output; `verbose` raises the harness to debug level.
/// `RUST_LOG` overrides both. Safe to call more than once.
pub fn init_logger(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slimtest={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logger(false);
        init_logger(true);
    }
}
