//! Crate-level error types.
//!
//! [`SymbolWatchError`] covers everything that can stop the application
//! from starting (configuration, terminal, logging, HTTP client setup).
//! Failures that only affect one instrument on one tick are reported as
//! [`SlotError`](crate::refresh::SlotError) instead and never abort a tick.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SymbolWatchError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum SymbolWatchError {
    /// Configuration is missing, unreadable, or describes nothing to watch.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal or file I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// The HTTP client could not be built.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
