//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::refresh::TickReport;

use super::app::App;

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),

    /// A refresh tick has begun.
    RefreshStarted,
    /// A refresh tick finished; carries every slot at once.
    TickCompleted(TickReport),

    /// Request to quit the application.
    Quit,
}

/// Actions that require handling outside the UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run a refresh tick now instead of waiting for the period.
    RefreshNow,
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    if tx.send(Message::Input(Event::Key(key))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Message::Input(Event::Resize(w, h))).is_err() {
                        break;
                    }
                }
                Ok(_) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) -> Option<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::RefreshStarted => {
            app.refresh_started();
            None
        }
        Message::TickCompleted(report) => {
            app.apply_report(report);
            None
        }
        Message::Quit => {
            app.should_quit = true;
            None
        }
    }
}

/// Handles input events and updates application state.
fn handle_input(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => None,
        Event::Tick => {
            app.clear_stale_errors();
            None
        }
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            None
        }
        // Raw mode swallows SIGINT.
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            None
        }
        KeyCode::Char('r') => Some(Action::RefreshNow),
        KeyCode::Char('l') => {
            app.toggle_legend();
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::PortfolioSummary;
    use crate::refresh::SlotState;
    use chrono::Utc;

    fn app() -> App {
        let config = AppConfig::from_symbols(vec!["AAPL".to_string()]).unwrap();
        let layout = config.layout.plan(1).unwrap();
        App::new(&config, layout)
    }

    fn key(code: KeyCode) -> Message {
        Message::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = app();
            assert_eq!(update(&mut app, key(code)), None);
            assert!(app.should_quit);
        }

        let mut app = app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        update(&mut app, Message::Input(Event::Key(ctrl_c)));
        assert!(app.should_quit);
    }

    #[test]
    fn refresh_key_requests_action() {
        let mut app = app();
        assert_eq!(update(&mut app, key(KeyCode::Char('r'))), Some(Action::RefreshNow));
        assert!(!app.should_quit);
    }

    #[test]
    fn legend_key_toggles() {
        let mut app = app();
        assert!(app.show_legend);
        update(&mut app, key(KeyCode::Char('l')));
        assert!(!app.show_legend);
        update(&mut app, key(KeyCode::Char('l')));
        assert!(app.show_legend);
    }

    #[test]
    fn tick_messages_drive_state() {
        let mut app = app();
        update(&mut app, Message::RefreshStarted);
        assert_eq!(app.refresh_status.label(), "Refreshing");

        let report = TickReport {
            sequence: 1,
            slots: vec![SlotState::Pending],
            summary: PortfolioSummary::default(),
            completed_at: Utc::now(),
        };
        update(&mut app, Message::TickCompleted(report));
        assert_eq!(app.refresh_status.label(), "Idle");
        assert_eq!(app.ticks_completed, 1);
    }
}
