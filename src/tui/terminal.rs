//! Terminal setup and teardown.

use std::io::{self, IsTerminal, Stdout};

use crossterm::{
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{Result, SymbolWatchError};

/// Window title shown while the grid is up.
pub const WINDOW_TITLE: &str = "Symbol Watcher";

/// Terminal backed by stdout.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

fn io_error(context: &str, err: io::Error) -> SymbolWatchError {
    SymbolWatchError::Io(format!("{context}: {err}"))
}

/// Puts the terminal into raw mode on the alternate screen and titles the
/// window.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Io`] if stdout is not a TTY or the terminal
/// cannot be switched over. Raw mode is undone before returning an error.
pub fn setup_terminal() -> Result<Tui> {
    if !io::stdout().is_terminal() {
        return Err(SymbolWatchError::Io(
            "the chart grid needs an interactive terminal (TTY)".to_string(),
        ));
    }

    enable_raw_mode().map_err(|e| io_error("failed to enable raw mode", e))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, SetTitle(WINDOW_TITLE)) {
        let _ = disable_raw_mode();
        return Err(io_error("failed to enter alternate screen", e));
    }

    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        io_error("failed to create terminal", e)
    })
}

/// Leaves raw mode and the alternate screen and shows the cursor again.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Io`] if any step fails.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().map_err(|e| io_error("failed to disable raw mode", e))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| io_error("failed to leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| io_error("failed to show cursor", e))
}
