//! Application state for the TUI.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::{AppConfig, Palette};
use crate::layout::GridLayout;
use crate::models::PortfolioSummary;
use crate::refresh::{SlotState, TickReport};

/// How long an error stays in the status bar.
const ERROR_DISPLAY_SECS: u64 = 5;

/// Central application state container.
pub struct App {
    // -- Grid --
    /// Symbols in declaration order, one per slot.
    pub symbols: Vec<String>,
    /// Slot positions, fixed for the run.
    pub layout: GridLayout,
    /// What each slot currently shows.
    pub slots: Vec<SlotState>,

    // -- Portfolio --
    /// Totals from the last completed tick.
    pub summary: PortfolioSummary,
    /// Currency totals and holding values are shown in.
    pub display_currency: String,
    pub palette: Palette,

    // -- Refresh --
    pub refresh_status: RefreshStatus,
    pub refresh_period: Duration,
    /// Number of ticks applied so far.
    pub ticks_completed: u64,
    /// Completion time of the last applied tick.
    pub last_tick: Option<DateTime<Utc>>,

    // -- UI State --
    /// Whether the colour legend line is shown.
    pub show_legend: bool,
    /// Error message to display (auto-clears).
    pub error_message: Option<ErrorDisplay>,
    /// Whether the application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates state for `config` laid out on `layout`, with every slot
    /// pending until the first tick lands.
    pub fn new(config: &AppConfig, layout: GridLayout) -> Self {
        let symbols = config.symbols();
        let slots = vec![SlotState::Pending; symbols.len()];
        Self {
            symbols,
            layout,
            slots,
            summary: PortfolioSummary::default(),
            display_currency: config.display_currency.clone(),
            palette: config.palette,
            refresh_status: RefreshStatus::Waiting,
            refresh_period: config.refresh_period(),
            ticks_completed: 0,
            last_tick: None,
            show_legend: true,
            error_message: None,
            should_quit: false,
        }
    }

    /// Marks a tick as in flight. Slots keep their previous content until
    /// the report arrives.
    pub fn refresh_started(&mut self) {
        self.refresh_status = RefreshStatus::Refreshing;
    }

    /// Replaces every slot and the summary with a completed tick.
    pub fn apply_report(&mut self, report: TickReport) {
        if report.slots.len() != self.slots.len() {
            self.show_error(format!(
                "refresh returned {} slots for {} symbols",
                report.slots.len(),
                self.slots.len()
            ));
            return;
        }

        self.slots = report.slots;
        self.summary = report.summary;
        self.last_tick = Some(report.completed_at);
        self.ticks_completed += 1;
        self.refresh_status = RefreshStatus::Idle;

        if self.unavailable_count() == self.slots.len() {
            self.show_error("no data for any symbol");
        }
    }

    /// Slots showing a placeholder after the last tick.
    pub fn unavailable_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, SlotState::Unavailable(_)))
            .count()
    }

    pub fn toggle_legend(&mut self) {
        self.show_legend = !self.show_legend;
    }

    /// Sets an error message to display.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(ErrorDisplay {
            message: message.into(),
            timestamp: Instant::now(),
        });
    }

    /// Clears error messages older than five seconds.
    pub fn clear_stale_errors(&mut self) {
        if let Some(ref error) = self.error_message
            && error.timestamp.elapsed() > Duration::from_secs(ERROR_DISPLAY_SECS)
        {
            self.error_message = None;
        }
    }
}

/// Where the refresh loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// Before the first tick.
    Waiting,
    Refreshing,
    Idle,
}

impl RefreshStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshStatus::Waiting => "Waiting",
            RefreshStatus::Refreshing => "Refreshing",
            RefreshStatus::Idle => "Idle",
        }
    }
}

/// Error message with timestamp for auto-clear.
#[derive(Clone, Debug)]
pub struct ErrorDisplay {
    /// The error message.
    pub message: String,
    /// When the error was shown.
    pub timestamp: Instant,
}
