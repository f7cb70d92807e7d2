//! Per-instrument display metrics and the portfolio-wide summary.
//!
//! Both are recomputed from scratch on every refresh tick. Nothing here
//! carries state from one tick to the next.

use rust_decimal::Decimal;

use super::instrument::Instrument;
use super::series::PriceSeries;

/// Absolute and relative change between two closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntradayChange {
    pub absolute: Decimal,
    /// Percentage change; `None` when the baseline close is zero.
    pub percent: Option<Decimal>,
}

/// Why metrics could not be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("series is empty")]
    EmptySeries,
    /// The conversion rate is zero or the division overflows.
    #[error("price cannot be converted at the given rate")]
    Conversion,
    #[error("values out of range")]
    Overflow,
}

/// Change from the first close of the window to the latest one.
///
/// The first close of the fetched window is the baseline, not the previous
/// session's official close. Returns `None` if the difference overflows.
pub fn intraday_change(first_close: Decimal, latest_close: Decimal) -> Option<IntradayChange> {
    let absolute = latest_close.checked_sub(first_close)?;
    let percent = absolute
        .checked_div(first_close)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
    Some(IntradayChange { absolute, percent })
}

/// Everything shown for one instrument after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub symbol: String,
    /// Latest close in the instrument's own currency.
    pub latest_close: Decimal,
    /// First close of the window, the intraday baseline.
    pub first_close: Decimal,
    pub native_currency: String,
    /// Cross-rate used to reach the display currency, if one was needed.
    pub conversion_rate: Option<Decimal>,
    /// Latest close expressed in the display currency.
    pub display_price: Decimal,
    pub holding_value: Decimal,
    /// Holding value minus what the holding cost.
    pub value_change: Decimal,
    pub intraday_change: Decimal,
    pub intraday_change_pct: Option<Decimal>,
}

impl DisplayMetrics {
    /// Derives metrics for `instrument` from its latest series.
    ///
    /// `conversion_rate` is the number of native units per display unit; the
    /// native price is divided by it.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::EmptySeries`] for an empty series,
    /// [`MetricsError::Conversion`] if dividing by the rate fails, and
    /// [`MetricsError::Overflow`] if a value does not fit a `Decimal`.
    pub fn derive(
        instrument: &Instrument,
        series: &PriceSeries,
        native_currency: &str,
        conversion_rate: Option<Decimal>,
    ) -> Result<Self, MetricsError> {
        let first_close = series.first_close().ok_or(MetricsError::EmptySeries)?;
        let latest_close = series.latest_close().ok_or(MetricsError::EmptySeries)?;

        let display_price = match conversion_rate {
            Some(rate) => latest_close
                .checked_div(rate)
                .ok_or(MetricsError::Conversion)?,
            None => latest_close,
        };

        let holding_value = instrument
            .quantity()
            .checked_mul(display_price)
            .ok_or(MetricsError::Overflow)?;
        let value_change = instrument
            .cost_basis()
            .and_then(|cost| holding_value.checked_sub(cost))
            .ok_or(MetricsError::Overflow)?;
        let change = intraday_change(first_close, latest_close).ok_or(MetricsError::Overflow)?;

        Ok(Self {
            symbol: instrument.symbol.clone(),
            latest_close,
            first_close,
            native_currency: native_currency.to_string(),
            conversion_rate,
            display_price,
            holding_value,
            value_change,
            intraday_change: change.absolute,
            intraday_change_pct: change.percent,
        })
    }

    /// Whether the price is at or above the intraday baseline.
    pub fn is_up(&self) -> bool {
        self.intraday_change >= Decimal::ZERO
    }
}

/// Portfolio totals for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub total_value_change: Decimal,
    /// Instruments that contributed to the totals.
    pub instruments_with_data: usize,
    /// Instruments left out this tick.
    pub instruments_without_data: usize,
}

impl PortfolioSummary {
    /// Adds one instrument's metrics to the totals. On overflow the totals
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Overflow`] if either total would overflow.
    pub fn add(&mut self, metrics: &DisplayMetrics) -> Result<(), MetricsError> {
        let total_value = self
            .total_value
            .checked_add(metrics.holding_value)
            .ok_or(MetricsError::Overflow)?;
        let total_value_change = self
            .total_value_change
            .checked_add(metrics.value_change)
            .ok_or(MetricsError::Overflow)?;

        self.total_value = total_value;
        self.total_value_change = total_value_change;
        self.instruments_with_data += 1;
        Ok(())
    }

    /// Counts an instrument that produced no metrics this tick.
    pub fn record_missing(&mut self) {
        self.instruments_without_data += 1;
    }
}
