//! Market data provider abstraction.
//!
//! The refresh cycle only talks to [`MarketData`]; [`yahoo::YahooProvider`]
//! is the production implementation and tests substitute their own.

pub mod yahoo;

use async_trait::async_trait;

use crate::models::PriceSeries;

pub use yahoo::YahooProvider;

/// Failure to obtain data from a provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request failed or timed out.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an error object.
    #[error("provider error {code}: {description}")]
    Api { code: String, description: String },

    /// The response could not be turned into a series.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Source of intraday series and quote currencies.
///
/// Implementations must return an empty series rather than an error when a
/// symbol simply has no data for the requested window.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetches OHLCV bars for `symbol` covering `period` at `interval`
    /// granularity (e.g. `"1d"` and `"1m"`).
    async fn fetch_series(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceSeries, ProviderError>;

    /// Returns the currency `symbol` is quoted in, if the provider knows it.
    async fn fetch_quote_currency(&self, symbol: &str) -> Result<Option<String>, ProviderError>;
}
