//! Domain models and provider wire types.
//!
//! Contains the watched [`Instrument`](instrument::Instrument)s, the
//! [`PriceSeries`](series::PriceSeries) fetched on each tick, the metrics
//! derived from it, and the Yahoo chart payload the series is parsed from.

pub mod chart;
pub mod instrument;
pub mod metrics;
pub mod series;

pub use instrument::{Holding, Instrument};
pub use metrics::{DisplayMetrics, IntradayChange, MetricsError, PortfolioSummary, intraday_change};
pub use series::{Observation, PriceSeries, SeriesError};
