//! Terminal chart grid.
//!
//! One bordered panel per watched symbol, a portfolio summary header, an
//! optional colour legend and a status bar.

pub mod app;
pub mod components;
pub mod event;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Action, Event, Message};
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
