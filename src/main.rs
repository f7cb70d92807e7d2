use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use symbolwatch::config::fetch_config;
use symbolwatch::logging::init_logging;
use symbolwatch::provider::YahooProvider;
use symbolwatch::refresh::RefreshSession;
use symbolwatch::scheduler::{RefreshScheduler, RefreshTrigger, spawn_refresh_loop};
use symbolwatch::tui::components::legend;
use symbolwatch::tui::event::{spawn_event_reader, spawn_tick_timer, update};
use symbolwatch::tui::{self, Action, App, Message, Tui};
use symbolwatch::{Result, SymbolWatchError};

/// Redraw cadence for clearing stale status messages.
const UI_TICK_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = init_logging()?;

    let config = fetch_config()?;
    let layout = config.layout.plan(config.instruments.len())?;
    info!(
        symbols = ?config.symbols(),
        currency = %config.display_currency,
        rows = layout.rows(),
        columns = layout.columns(),
        log = %log_path.display(),
        "Starting"
    );
    for (label, color) in legend::entries(&config.palette) {
        info!(layer = label, color = %color, "Legend");
    }

    let provider = YahooProvider::new(&config.provider_url)?;
    let session = Arc::new(RefreshSession::from_config(provider, &config, layout.clone())?);
    let scheduler = RefreshScheduler::new(config.refresh_period());
    let trigger = scheduler.trigger();

    let mut app = App::new(&config, layout);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut terminal = tui::setup_terminal()?;
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx.clone(), UI_TICK_MS);
    let quit_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = quit_tx.send(Message::Quit);
        }
    });
    let refresh_task = spawn_refresh_loop(scheduler, session, tx);

    let result = run(&mut terminal, &mut app, &mut rx, &trigger).await;

    refresh_task.abort();
    tui::restore_terminal(&mut terminal)?;

    if let Err(ref e) = result {
        error!(error = %e, "Exited with error");
    }
    info!(ticks = app.ticks_completed, "Stopped");
    result
}

/// Draws and dispatches messages until the user quits.
async fn run(
    terminal: &mut Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Message>,
    trigger: &RefreshTrigger,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| tui::render(frame, app))
            .map_err(|e| SymbolWatchError::Io(format!("failed to draw: {e}")))?;

        let Some(message) = rx.recv().await else {
            return Ok(());
        };
        if let Some(Action::RefreshNow) = update(app, message) {
            info!("Refresh requested from keyboard");
            trigger.request();
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
