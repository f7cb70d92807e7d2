//! Log file setup.
//!
//! The terminal belongs to the chart grid, so log output goes to a file
//! named by `SYMBOLWATCH_LOG` (default `symbolwatch.log`). Verbosity follows
//! `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::{Result, SymbolWatchError};

/// Log file used when `SYMBOLWATCH_LOG` is unset.
pub const DEFAULT_LOG_PATH: &str = "symbolwatch.log";

/// Path logging will write to.
pub fn log_path() -> PathBuf {
    std::env::var("SYMBOLWATCH_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_PATH), PathBuf::from)
}

/// Installs the global subscriber, appending to [`log_path`].
///
/// # Errors
///
/// Returns [`SymbolWatchError::Io`] if the file cannot be opened or a global
/// subscriber is already set.
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| SymbolWatchError::Io(format!("failed to open {}: {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| SymbolWatchError::Io(format!("failed to install logger: {e}")))?;

    Ok(path)
}
