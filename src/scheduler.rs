//! Periodic refresh driver.
//!
//! A single task runs ticks back to back on the configured period. The first
//! tick fires immediately. A manual request starts a tick straight away and
//! restarts the period from there. Ticks never overlap; a tick that runs
//! past a boundary delays the next one instead of queueing a burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::provider::MarketData;
use crate::refresh::RefreshSession;
use crate::tui::Message;

/// Handle for requesting an out-of-schedule refresh.
///
/// Requests made while a tick is running collapse into one follow-up tick.
#[derive(Debug, Clone)]
pub struct RefreshTrigger(Arc<Notify>);

impl RefreshTrigger {
    pub fn request(&self) {
        self.0.notify_one();
    }
}

/// Drives a [`RefreshSession`] on a fixed period.
#[derive(Debug)]
pub struct RefreshScheduler {
    period: Duration,
    trigger: Arc<Notify>,
}

impl RefreshScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            trigger: Arc::new(Notify::new()),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger(Arc::clone(&self.trigger))
    }

    /// Runs ticks until `tx` is closed.
    ///
    /// Each tick sends [`Message::RefreshStarted`] followed by
    /// [`Message::TickCompleted`] carrying the whole report.
    pub async fn run<P: MarketData>(
        self,
        session: Arc<RefreshSession<P>>,
        tx: mpsc::UnboundedSender<Message>,
    ) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = self.trigger.notified() => {
                    debug!("Manual refresh requested");
                    interval.reset();
                }
                () = tx.closed() => break,
            }

            if tx.send(Message::RefreshStarted).is_err() {
                break;
            }

            let report = session.refresh().await;
            info!(sequence = report.sequence, slots = report.slots.len(), "Tick finished");

            if tx.send(Message::TickCompleted(report)).is_err() {
                break;
            }
        }

        info!(ticks = session.ticks_run(), "Refresh loop stopped");
    }
}

/// Spawns [`RefreshScheduler::run`] on the runtime.
pub fn spawn_refresh_loop<P: MarketData + 'static>(
    scheduler: RefreshScheduler,
    session: Arc<RefreshSession<P>>,
    tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(scheduler.run(session, tx))
}
