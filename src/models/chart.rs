//! Yahoo Finance `v8/finance/chart` response models.
//!
//! Every indicator array may contain `null` entries for bars where the
//! exchange reported nothing, and the arrays are missing entirely when the
//! window holds no data.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level wrapper of a chart response.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

/// Either a result list or an error object.
#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// API-level error such as an unknown symbol.
#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Chart data for one symbol.
#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar start times in UNIX seconds.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

/// Instrument metadata attached to a chart result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub gmtoffset: i32,
    pub exchange_timezone_name: Option<String>,
    pub regular_market_price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
}

/// Column-wise OHLCV arrays, index-aligned with [`ChartResult::timestamp`].
#[derive(Debug, Default, Deserialize)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub open: Vec<Option<Decimal>>,
    #[serde(default)]
    pub high: Vec<Option<Decimal>>,
    #[serde(default)]
    pub low: Vec<Option<Decimal>>,
    #[serde(default)]
    pub close: Vec<Option<Decimal>>,
    #[serde(default)]
    pub volume: Vec<Option<Decimal>>,
}
