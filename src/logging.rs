//! Tracing subscriber setup for the binary.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INITIALIZED: OnceLock<()> = OnceLock::new();

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Another global subscriber was installed first.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a stdout subscriber filtered by `RUST_LOG` (default `info`).
///
/// Subsequent calls are no-ops.
pub fn init() -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    let _ = INITIALIZED.set(());
    Ok(())
}
