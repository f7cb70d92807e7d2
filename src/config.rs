//! Application configuration.
//!
//! The watch list is read from a JSON file whose path comes from
//! `SYMBOLWATCH_CONFIG` (default `symbolwatch.json`). When that file does
//! not exist the user is prompted for a comma-separated symbol list and
//! every other setting takes its default.
//!
//! Environment variables override the file:
//! - `SYMBOLWATCH_DISPLAY_CURRENCY`: currency values are shown in
//! - `SYMBOLWATCH_REFRESH_MS`: refresh period in milliseconds
//! - `SYMBOLWATCH_PROVIDER_URL`: base URL of the chart API

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ratatui::style::Color;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::layout::{GridLayout, plan_layout};
use crate::models::Instrument;
use crate::provider::yahoo::DEFAULT_BASE_URL;
use crate::{Result, SymbolWatchError};

/// Config file read when `SYMBOLWATCH_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "symbolwatch.json";

const DEFAULT_DISPLAY_CURRENCY: &str = "SEK";
const DEFAULT_REFRESH_MS: u64 = 120_000;
const DEFAULT_PERIOD: &str = "1d";
const DEFAULT_INTERVAL: &str = "1m";
const DEFAULT_CROSS_RATE_PERIOD: &str = "1mo";
const DEFAULT_CROSS_RATE_INTERVAL: &str = "1d";
const DEFAULT_MAX_SINGLE_COLUMN: usize = 4;
const DEFAULT_COLUMNS_WHEN_SPLIT: usize = 2;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Watched instruments in declaration order.
    pub instruments: Vec<Instrument>,
    pub display_currency: String,
    pub refresh_interval_ms: u64,
    pub fetch: FetchSettings,
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub provider_url: String,
}

/// Lookback windows and granularities passed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// How far back each series reaches, e.g. `1d`.
    pub period: String,
    /// Bar size, e.g. `1m`.
    pub interval: String,
    pub cross_rate_period: String,
    pub cross_rate_interval: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            cross_rate_period: DEFAULT_CROSS_RATE_PERIOD.to_string(),
            cross_rate_interval: DEFAULT_CROSS_RATE_INTERVAL.to_string(),
        }
    }
}

/// Grid thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Most instruments stacked in a single column.
    pub max_single_column: usize,
    /// Columns used once the single-column limit is exceeded.
    pub columns_when_split: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_single_column: DEFAULT_MAX_SINGLE_COLUMN,
            columns_when_split: DEFAULT_COLUMNS_WHEN_SPLIT,
        }
    }
}

impl LayoutConfig {
    /// Plans the grid for `count` instruments.
    ///
    /// # Errors
    ///
    /// See [`plan_layout`].
    pub fn plan(&self, count: usize) -> Result<GridLayout> {
        plan_layout(count, self.max_single_column, self.columns_when_split)
    }
}

/// Chart colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub open: Color,
    pub close: Color,
    pub high_low: Color,
    pub close_open: Color,
    pub volume: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            open: Color::Red,
            close: Color::Green,
            high_low: Color::Yellow,
            close_open: Color::Red,
            volume: Color::Gray,
        }
    }
}

/// Palette as written in the config file; any colour may be omitted.
#[derive(Debug, Default, Deserialize)]
struct PaletteFile {
    open: Option<String>,
    close: Option<String>,
    high_low: Option<String>,
    close_open: Option<String>,
    volume: Option<String>,
}

impl PaletteFile {
    fn resolve(self) -> Result<Palette> {
        let defaults = Palette::default();
        Ok(Palette {
            open: parse_color("open", self.open, defaults.open)?,
            close: parse_color("close", self.close, defaults.close)?,
            high_low: parse_color("high_low", self.high_low, defaults.high_low)?,
            close_open: parse_color("close_open", self.close_open, defaults.close_open)?,
            volume: parse_color("volume", self.volume, defaults.volume)?,
        })
    }
}

fn parse_color(field: &str, value: Option<String>, default: Color) -> Result<Color> {
    match value {
        None => Ok(default),
        Some(name) => Color::from_str(&name).map_err(|_| {
            SymbolWatchError::Config(format!("palette.{field}: unknown colour {name:?}"))
        }),
    }
}

/// On-disk layout of the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    instruments: Vec<InstrumentEntry>,
    display_currency: Option<String>,
    refresh_interval_ms: Option<u64>,
    #[serde(default)]
    fetch: FetchSettings,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    palette: PaletteFile,
    provider_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstrumentEntry {
    symbol: String,
    quantity: Option<Decimal>,
    purchase_price: Option<Decimal>,
}

impl InstrumentEntry {
    fn into_instrument(self) -> Result<Instrument> {
        let symbol = validate_symbol(&self.symbol)?;
        match (self.quantity, self.purchase_price) {
            (None, None) => Ok(Instrument::new(symbol)),
            (Some(quantity), Some(purchase_price)) => {
                if quantity.is_sign_negative() || purchase_price.is_sign_negative() {
                    return Err(SymbolWatchError::Config(format!(
                        "{symbol}: quantity and purchase_price must not be negative"
                    )));
                }
                Ok(Instrument::with_holding(symbol, quantity, purchase_price))
            }
            (Some(_), None) => Err(SymbolWatchError::Config(format!(
                "{symbol}: quantity is set but purchase_price is missing"
            ))),
            (None, Some(_)) => Err(SymbolWatchError::Config(format!(
                "{symbol}: purchase_price is set but quantity is missing"
            ))),
        }
    }
}

impl AppConfig {
    /// Builds a configuration for a bare symbol list with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolWatchError::Config`] if the list is empty or holds
    /// duplicates.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self> {
        let instruments = symbols.into_iter().map(Instrument::new).collect();
        let config = Self {
            instruments,
            display_currency: DEFAULT_DISPLAY_CURRENCY.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_MS,
            fetch: FetchSettings::default(),
            layout: LayoutConfig::default(),
            palette: Palette::default(),
            provider_url: DEFAULT_BASE_URL.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolWatchError::Json`] for malformed JSON and
    /// [`SymbolWatchError::Config`] for values that fail validation.
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(contents)?;

        let instruments = file
            .instruments
            .into_iter()
            .map(InstrumentEntry::into_instrument)
            .collect::<Result<Vec<_>>>()?;

        let config = Self {
            instruments,
            display_currency: file
                .display_currency
                .map(|c| c.trim().to_uppercase())
                .unwrap_or_else(|| DEFAULT_DISPLAY_CURRENCY.to_string()),
            refresh_interval_ms: file.refresh_interval_ms.unwrap_or(DEFAULT_REFRESH_MS),
            fetch: file.fetch,
            layout: file.layout,
            palette: file.palette.resolve()?,
            provider_url: file
                .provider_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SymbolWatchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Refresh period as a [`Duration`].
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Ticker symbols in declaration order.
    pub fn symbols(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.symbol.clone()).collect()
    }

    /// Applies `SYMBOLWATCH_*` environment overrides on top of the loaded
    /// values and re-validates.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolWatchError::Config`] if an override cannot be parsed
    /// or leaves the configuration invalid.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(currency) = non_empty_var("SYMBOLWATCH_DISPLAY_CURRENCY") {
            self.display_currency = currency.trim().to_uppercase();
        }
        if let Some(ms) = non_empty_var("SYMBOLWATCH_REFRESH_MS") {
            self.refresh_interval_ms = ms.trim().parse().map_err(|_| {
                SymbolWatchError::Config(format!(
                    "SYMBOLWATCH_REFRESH_MS must be a whole number of milliseconds, got {ms:?}"
                ))
            })?;
        }
        if let Some(url) = non_empty_var("SYMBOLWATCH_PROVIDER_URL") {
            self.provider_url = url;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(SymbolWatchError::Config(
                "no instruments configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for instrument in &self.instruments {
            validate_symbol(&instrument.symbol)?;
            if !seen.insert(instrument.symbol.as_str()) {
                return Err(SymbolWatchError::Config(format!(
                    "{} is listed more than once",
                    instrument.symbol
                )));
            }
        }

        if self.display_currency.is_empty()
            || !self.display_currency.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(SymbolWatchError::Config(format!(
                "display currency {:?} is not a currency code",
                self.display_currency
            )));
        }

        if self.refresh_interval_ms == 0 {
            return Err(SymbolWatchError::Config(
                "refresh interval must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("fetch.period", &self.fetch.period),
            ("fetch.interval", &self.fetch.interval),
            ("fetch.cross_rate_period", &self.fetch.cross_rate_period),
            ("fetch.cross_rate_interval", &self.fetch.cross_rate_interval),
        ] {
            if value.trim().is_empty() {
                return Err(SymbolWatchError::Config(format!("{name} must not be empty")));
            }
        }

        // Thresholds are checked by the planner itself.
        self.layout.plan(self.instruments.len()).map(|_| ())
    }
}

/// Loads the configuration file if it exists, otherwise prompts on the
/// terminal for a symbol list, then applies environment overrides.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Config`] if nothing usable was configured.
pub fn fetch_config() -> Result<AppConfig> {
    let path = non_empty_var("SYMBOLWATCH_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let path = Path::new(&path);

    let mut config = if path.exists() {
        AppConfig::load(path)?
    } else {
        let stdin = std::io::stdin();
        let symbols = prompt_symbols(&mut stdin.lock(), &mut std::io::stdout())?;
        AppConfig::from_symbols(symbols)?
    };

    config.apply_env_overrides()?;
    Ok(config)
}

/// Asks for a comma-separated symbol list and parses the answer.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Io`] if the terminal cannot be read or
/// written, and [`SymbolWatchError::Config`] if the answer holds no usable
/// symbol.
pub fn prompt_symbols<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>> {
    write!(output, "Enter ticker symbols separated by commas: ")
        .and_then(|()| output.flush())
        .map_err(|e| SymbolWatchError::Io(e.to_string()))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| SymbolWatchError::Io(e.to_string()))?;

    parse_symbol_list(&line)
}

/// Splits a comma-separated symbol list, trimming blanks and dropping empty
/// entries such as those left by `"AAPL,,MSFT"` or a trailing comma.
///
/// # Errors
///
/// Returns [`SymbolWatchError::Config`] if no symbol remains or an entry
/// contains whitespace.
pub fn parse_symbol_list(input: &str) -> Result<Vec<String>> {
    let symbols = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(validate_symbol)
        .collect::<Result<Vec<_>>>()?;

    if symbols.is_empty() {
        return Err(SymbolWatchError::Config(
            "no valid ticker symbols entered".to_string(),
        ));
    }
    Ok(symbols)
}

fn validate_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(SymbolWatchError::Config("empty ticker symbol".to_string()));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(SymbolWatchError::Config(format!(
            "ticker symbol {symbol:?} contains whitespace"
        )));
    }
    Ok(symbol.to_string())
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
