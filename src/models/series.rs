//! Intraday OHLCV series as returned by a market data provider.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Reason a series could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    /// Timestamps must be strictly increasing.
    #[error("observation {index} at {timestamp} does not follow the previous one")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Time-ordered observations for one symbol over one lookback window.
///
/// An empty series is valid: the provider had nothing for the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSeries {
    symbol: String,
    currency: Option<String>,
    utc_offset_secs: i32,
    observations: Vec<Observation>,
}

impl PriceSeries {
    /// Builds a series, rejecting observations whose timestamps are not
    /// strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::OutOfOrder`] naming the first offending
    /// observation.
    pub fn new(
        symbol: impl Into<String>,
        observations: Vec<Observation>,
    ) -> Result<Self, SeriesError> {
        if let Some(index) = observations
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(SeriesError::OutOfOrder {
                index: index + 1,
                timestamp: observations[index + 1].timestamp,
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            currency: None,
            utc_offset_secs: 0,
            observations,
        })
    }

    /// A series with no observations.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            currency: None,
            utc_offset_secs: 0,
            observations: Vec::new(),
        }
    }

    /// Attaches the currency the prices are quoted in.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Attaches the exchange's UTC offset, used only for display.
    #[must_use]
    pub fn with_utc_offset(mut self, secs: i32) -> Self {
        self.utc_offset_secs = secs;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Quote currency reported alongside the data, if any.
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Close of the first bar in the window.
    pub fn first_close(&self) -> Option<Decimal> {
        self.observations.first().map(|o| o.close)
    }

    /// Close of the most recent bar.
    pub fn latest_close(&self) -> Option<Decimal> {
        self.observations.last().map(|o| o.close)
    }

    /// Converts a timestamp to exchange-local time.
    ///
    /// Falls back to UTC if the stored offset is out of range.
    pub fn local_time(&self, timestamp: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.utc_offset_secs)
            .unwrap_or_else(|| Utc.fix());
        timestamp.with_timezone(&offset)
    }
}
