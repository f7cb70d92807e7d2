//! Shared test utilities.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;

use symbolwatch::models::{Observation, PriceSeries};
use symbolwatch::provider::{MarketData, ProviderError};

/// Path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Reads a fixture file.
pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
}

/// A series of one-minute bars with flat candles at the given closes.
pub fn series(symbol: &str, currency: Option<&str>, closes: &[Decimal]) -> PriceSeries {
    let observations = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Observation {
            timestamp: DateTime::from_timestamp(1_700_000_000 + 60 * i as i64, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::from(1000),
        })
        .collect();
    let series = PriceSeries::new(symbol, observations).unwrap();
    match currency {
        Some(c) => series.with_currency(c),
        None => series,
    }
}

#[derive(Default)]
struct MockState {
    series: HashMap<String, PriceSeries>,
    failures: HashSet<String>,
    quote_currencies: HashMap<String, String>,
    calls: Vec<String>,
}

/// In-memory [`MarketData`] whose data can be changed between ticks.
///
/// Clones share state, so a test can keep a handle after moving the
/// provider into a session. Unknown symbols yield an empty series.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(self, series: PriceSeries) -> Self {
        self.set_series(series);
        self
    }

    pub fn with_failure(self, symbol: &str) -> Self {
        self.state.lock().unwrap().failures.insert(symbol.to_string());
        self
    }

    pub fn with_quote_currency(self, symbol: &str, currency: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .quote_currencies
            .insert(symbol.to_string(), currency.to_string());
        self
    }

    /// Replaces the series served for its symbol.
    pub fn set_series(&self, series: PriceSeries) {
        self.state
            .lock()
            .unwrap()
            .series
            .insert(series.symbol().to_string(), series);
    }

    /// Symbols passed to `fetch_series`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl MarketData for MockProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<PriceSeries, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(symbol.to_string());
        if state.failures.contains(symbol) {
            return Err(ProviderError::Api {
                code: "Internal Server Error".to_string(),
                description: format!("{symbol} unavailable"),
            });
        }
        Ok(state
            .series
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| PriceSeries::empty(symbol)))
    }

    async fn fetch_quote_currency(&self, symbol: &str) -> Result<Option<String>, ProviderError> {
        Ok(self.state.lock().unwrap().quote_currencies.get(symbol).cloned())
    }
}
