//! crates/logging/src/tracing_bridge.rs
//! Installs the process-wide `tracing` subscriber.
//!
//! Diagnostics go to standard error through a `fmt` layer filtered by
//! [`LogConfig::filter`]. Human-readable progress does not pass through here;
//! it is written by [`ProgressSink`](crate::ProgressSink) directly.
//!
//! ```rust,ignore
//! use logging::{LogConfig, init_tracing};
//!
//! init_tracing(LogConfig::default())?;
//! tracing::info!(target: "argon2::select", "selection started");
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::LogConfig;

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init_tracing(config: LogConfig) -> Result<(), TryInitError> {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_ansi(config.ansi);

    tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let config = LogConfig::default();
        // Another test binary thread may have won the first install.
        let _ = init_tracing(config.clone());
        assert!(init_tracing(config).is_err());
    }
}
