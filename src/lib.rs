//! Live intraday chart grid for a watched portfolio.
//!
//! Periodically fetches intraday price series for a list of ticker symbols,
//! converts prices into one display currency, values any configured
//! holdings, and draws every symbol in its own panel of a terminal grid.

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod models;
pub mod provider;
pub mod refresh;
pub mod scheduler;
pub mod tui;

pub use error::{Result, SymbolWatchError};
