//! Yahoo Finance chart API provider.
//!
//! Uses the public `v8/finance/chart/{symbol}` endpoint, which returns the
//! quote currency and the OHLCV arrays in a single response. Works for
//! equities (`AAPL`, `SAAB-B.ST`), indices (`^OMX`) and exchange rates
//! (`SEKUSD=X`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use rust_decimal::Decimal;
use tracing::debug;

use super::{MarketData, ProviderError};
use crate::models::chart::{ChartResponse, ChartResult};
use crate::models::{Observation, PriceSeries};
use crate::{Result, SymbolWatchError};

/// Public chart API host.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error code Yahoo uses for unknown or delisted symbols.
const NOT_FOUND_CODE: &str = "Not Found";

/// HTTP client for the Yahoo chart API.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooProvider {
    /// Creates a provider talking to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolWatchError::Config`] if the URL does not parse and
    /// [`SymbolWatchError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            SymbolWatchError::Config(format!("invalid provider URL {base_url:?}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SymbolWatchError::Config(format!(
                "provider URL {base_url} cannot carry a path"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds `{base}/v8/finance/chart/{symbol}` with the symbol
    /// percent-encoded as a single path segment.
    fn chart_url(&self, symbol: &str) -> std::result::Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ProviderError::Malformed(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> std::result::Result<Option<ChartResult>, ProviderError> {
        let url = self.chart_url(symbol)?;
        debug!(symbol, range, interval, "Requesting chart");

        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await?;

        // Error responses (404 for unknown symbols) still carry a chart body.
        let status = response.status();
        let body = response.text().await?;
        let parsed: ChartResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                ProviderError::Malformed(e.to_string())
            } else {
                ProviderError::Api {
                    code: status.as_str().to_string(),
                    description: status.canonical_reason().unwrap_or("unknown").to_string(),
                }
            }
        })?;

        chart_result(parsed)
    }
}

#[async_trait]
impl MarketData for YahooProvider {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> std::result::Result<PriceSeries, ProviderError> {
        let result = self.fetch_chart(symbol, period, interval).await?;
        let series = series_from_chart(symbol, result)?;
        debug!(symbol, bars = series.len(), "Chart parsed");
        Ok(series)
    }

    async fn fetch_quote_currency(
        &self,
        symbol: &str,
    ) -> std::result::Result<Option<String>, ProviderError> {
        let result = self.fetch_chart(symbol, "1d", "1d").await?;
        Ok(result.and_then(|r| r.meta.currency))
    }
}

/// Picks the single chart result out of a response.
///
/// A "Not Found" error and a missing result both mean "no data" and yield
/// `Ok(None)`; any other error object is an [`ProviderError::Api`].
///
/// # Errors
///
/// Returns [`ProviderError::Api`] for error objects other than "Not Found".
pub fn chart_result(
    response: ChartResponse,
) -> std::result::Result<Option<ChartResult>, ProviderError> {
    if let Some(error) = response.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(None);
        }
        return Err(ProviderError::Api {
            code: error.code,
            description: error.description.unwrap_or_default(),
        });
    }

    Ok(response.chart.result.and_then(|r| r.into_iter().next()))
}

/// Converts a chart result into a [`PriceSeries`].
///
/// Bars without a close are dropped. Missing open, high or low values fall
/// back to the close and a missing volume counts as zero.
///
/// # Errors
///
/// Returns [`ProviderError::Malformed`] if a timestamp is out of range or
/// the bars are not in strictly increasing time order.
pub fn series_from_chart(
    symbol: &str,
    result: Option<ChartResult>,
) -> std::result::Result<PriceSeries, ProviderError> {
    let Some(result) = result else {
        return Ok(PriceSeries::empty(symbol));
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |values: &[Option<Decimal>], i: usize| values.get(i).copied().flatten();

    let mut observations = Vec::with_capacity(result.timestamp.len());
    for (i, &secs) in result.timestamp.iter().enumerate() {
        let Some(close) = column(&quote.close, i) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            ProviderError::Malformed(format!("{symbol}: timestamp {secs} out of range"))
        })?;
        observations.push(Observation {
            timestamp,
            open: column(&quote.open, i).unwrap_or(close),
            high: column(&quote.high, i).unwrap_or(close),
            low: column(&quote.low, i).unwrap_or(close),
            close,
            volume: column(&quote.volume, i).unwrap_or(Decimal::ZERO),
        });
    }

    let mut series = PriceSeries::new(symbol, observations)
        .map_err(|e| ProviderError::Malformed(format!("{symbol}: {e}")))?
        .with_utc_offset(result.meta.gmtoffset);
    if let Some(currency) = result.meta.currency {
        series = series.with_currency(currency);
    }
    Ok(series)
}
