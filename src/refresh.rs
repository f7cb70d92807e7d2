//! One refresh tick over the whole watch list.
//!
//! [`RefreshSession`] owns everything a tick needs (instruments, grid,
//! display currency, fetch windows, provider) and produces a
//! [`TickReport`] per call. Instruments are processed serially in
//! declaration order. A failure for one instrument is recorded in its slot
//! and never stops the rest of the tick.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, FetchSettings};
use crate::layout::GridLayout;
use crate::models::{DisplayMetrics, Instrument, MetricsError, PortfolioSummary, PriceSeries};
use crate::provider::MarketData;
use crate::{Result, SymbolWatchError};

/// Why a slot shows a placeholder instead of a chart this tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The provider returned an empty series.
    #[error("no data available")]
    NoDataAvailable,

    /// The cross-rate needed to reach the display currency was missing or
    /// zero.
    #[error("currency conversion failed ({pair})")]
    CurrencyConversionFailure { pair: String },

    /// The provider call itself failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A derived value or the running total does not fit a `Decimal`.
    #[error("values out of range")]
    OutOfRange,
}

/// What a slot shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// No tick has completed yet.
    Pending,
    /// Metrics and the series they were derived from.
    Ready(Box<SlotView>),
    /// Nothing to draw this tick.
    Unavailable(SlotError),
}

impl SlotState {
    pub fn metrics(&self) -> Option<&DisplayMetrics> {
        match self {
            SlotState::Ready(view) => Some(&view.metrics),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SlotError> {
        match self {
            SlotState::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

/// Data behind a drawn slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub metrics: DisplayMetrics,
    pub series: PriceSeries,
}

/// Complete outcome of one tick.
///
/// Always holds exactly one state per configured instrument, in declaration
/// order, so it can be applied to the display in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Position of this tick in the session, starting at 1.
    pub sequence: u64,
    pub slots: Vec<SlotState>,
    pub summary: PortfolioSummary,
    pub completed_at: DateTime<Utc>,
}

/// Builds the cross-rate ticker that converts `native` prices into
/// `display` currency, e.g. `SEKUSD=X`.
pub fn cross_rate_symbol(display: &str, native: &str) -> String {
    format!("{display}{native}=X")
}

/// Everything a refresh tick reads.
pub struct RefreshSession<P> {
    provider: P,
    instruments: Vec<Instrument>,
    layout: GridLayout,
    display_currency: String,
    fetch: FetchSettings,
    ticks: AtomicU64,
}

impl<P: MarketData> RefreshSession<P> {
    /// Creates a session for `instruments` placed on `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolWatchError::Config`] if `layout` was not planned for
    /// the same number of instruments.
    pub fn new(
        provider: P,
        instruments: Vec<Instrument>,
        layout: GridLayout,
        display_currency: impl Into<String>,
        fetch: FetchSettings,
    ) -> Result<Self> {
        if instruments.len() != layout.len() {
            return Err(SymbolWatchError::Config(format!(
                "layout has {} slots for {} instruments",
                layout.len(),
                instruments.len()
            )));
        }
        Ok(Self {
            provider,
            instruments,
            layout,
            display_currency: display_currency.into(),
            fetch,
            ticks: AtomicU64::new(0),
        })
    }

    /// Creates a session from loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`RefreshSession::new`].
    pub fn from_config(provider: P, config: &AppConfig, layout: GridLayout) -> Result<Self> {
        Self::new(
            provider,
            config.instruments.clone(),
            layout,
            config.display_currency.clone(),
            config.fetch.clone(),
        )
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn display_currency(&self) -> &str {
        &self.display_currency
    }

    /// Number of ticks started so far.
    pub fn ticks_run(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Runs one tick: fetches and derives every instrument in order and
    /// totals the ones that succeeded.
    pub async fn refresh(&self) -> TickReport {
        let sequence = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let mut summary = PortfolioSummary::default();
        let mut slots = Vec::with_capacity(self.instruments.len());

        for slot in self.layout.slots() {
            let instrument = &self.instruments[slot.index];
            let outcome = self.refresh_instrument(instrument).await.and_then(|view| {
                summary
                    .add(&view.metrics)
                    .map(|()| view)
                    .map_err(|_| SlotError::OutOfRange)
            });
            let state = match outcome {
                Ok(view) => SlotState::Ready(Box::new(view)),
                Err(err) => {
                    warn!(symbol = %instrument.symbol, error = %err, "Slot unavailable this tick");
                    summary.record_missing();
                    SlotState::Unavailable(err)
                }
            };
            slots.push(state);
        }

        info!(
            sequence,
            total_value = %summary.total_value,
            total_value_change = %summary.total_value_change,
            with_data = summary.instruments_with_data,
            without_data = summary.instruments_without_data,
            "Refresh complete"
        );

        TickReport {
            sequence,
            slots,
            summary,
            completed_at: Utc::now(),
        }
    }

    async fn refresh_instrument(
        &self,
        instrument: &Instrument,
    ) -> std::result::Result<SlotView, SlotError> {
        let symbol = instrument.symbol.as_str();
        let series = self
            .provider
            .fetch_series(symbol, &self.fetch.period, &self.fetch.interval)
            .await
            .map_err(|e| SlotError::Fetch(e.to_string()))?;

        if series.is_empty() {
            return Err(SlotError::NoDataAvailable);
        }

        let native_currency = self.native_currency(symbol, &series).await?;
        let rate = if native_currency == self.display_currency {
            None
        } else {
            Some(self.cross_rate(&native_currency).await?)
        };

        let metrics = DisplayMetrics::derive(instrument, &series, &native_currency, rate)
            .map_err(|e| match e {
                MetricsError::EmptySeries => SlotError::NoDataAvailable,
                MetricsError::Conversion => SlotError::CurrencyConversionFailure {
                    pair: cross_rate_symbol(&self.display_currency, &native_currency),
                },
                MetricsError::Overflow => SlotError::OutOfRange,
            })?;

        if metrics.intraday_change_pct.is_none() {
            warn!(symbol, "First close is zero, intraday percentage unavailable");
        }
        debug!(
            symbol,
            close = %metrics.latest_close,
            value = %metrics.holding_value,
            "Derived metrics"
        );

        Ok(SlotView { metrics, series })
    }

    /// Currency reported with the series, else asked for separately. An
    /// instrument whose currency nobody knows is taken to be quoted in the
    /// display currency.
    async fn native_currency(
        &self,
        symbol: &str,
        series: &PriceSeries,
    ) -> std::result::Result<String, SlotError> {
        if let Some(currency) = series.currency() {
            return Ok(currency.to_string());
        }

        let currency = self
            .provider
            .fetch_quote_currency(symbol)
            .await
            .map_err(|e| SlotError::Fetch(e.to_string()))?;

        Ok(currency.unwrap_or_else(|| {
            warn!(symbol, currency = %self.display_currency, "Quote currency unknown, assuming display currency");
            self.display_currency.clone()
        }))
    }

    /// Latest close of the cross-rate series. Missing, empty, or zero rates
    /// are conversion failures; nothing falls back to the native price.
    async fn cross_rate(&self, native_currency: &str) -> std::result::Result<Decimal, SlotError> {
        let pair = cross_rate_symbol(&self.display_currency, native_currency);
        let series = self
            .provider
            .fetch_series(
                &pair,
                &self.fetch.cross_rate_period,
                &self.fetch.cross_rate_interval,
            )
            .await;

        match series.map(|s| s.latest_close()) {
            Ok(Some(rate)) if rate > Decimal::ZERO => Ok(rate),
            Ok(_) => Err(SlotError::CurrencyConversionFailure { pair }),
            Err(e) => {
                warn!(pair = %pair, error = %e, "Cross-rate fetch failed");
                Err(SlotError::CurrencyConversionFailure { pair })
            }
        }
    }
}
