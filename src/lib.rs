//! # ivbox - Initial Volatility Box extraction
//!
//! Detects the intraday "initial volatility box" pattern on candle series: a range
//! formed during a fixed clock window, its first directional breakout, the
//! confirmation of that breakout, extension targets reached afterwards, and a
//! possible inverse (failure) breakout with its own confirmation and targets.
//!
//! ## Quick Start
//!
//! ```rust
//! use ivbox::prelude::*;
//!
//! let extractor = ExtractorBuilder::new()
//!     .dataset("yahoo")
//!     .build()
//!     .unwrap();
//!
//! // 5-minute candles for one instrument, ascending by timestamp
//! let candles: Vec<Candle> = vec![];
//! let days = extractor.partition(&candles);
//! let records: Vec<BreakoutBoxRecord> = days
//!     .iter()
//!     .filter_map(|day| extractor.extract_day("NQ=F", day))
//!     .collect();
//! assert!(records.is_empty());
//! ```

pub mod analysis;
pub mod calendar;
pub mod config;
pub mod detectors;
pub mod record;

pub mod prelude {
    pub use crate::{
        // Pipeline stages
        analysis::{analyze_day, DayAnalysis, Leg},
        calendar::{partition, SessionBar, TradingDay},
        // Configuration
        config::{HistoryRequest, SessionConfig, MAX_HISTORY_DAYS},
        detectors::*,
        // Parallel
        extract_parallel,
        // Output
        record::{BreakoutBoxRecord, RecordKey},
        // Types
        Candle,
        CandleSource,
        Direction,
        // Errors
        ExtractError,
        ExtractFailure,
        ExtractResult,
        // Engine
        Extractor,
        ExtractorBuilder,
        Ohlc,
        OhlcExt,
        Result,
        Side,
    };
}

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use calendar::TradingDay;
use config::{HistoryRequest, SessionConfig};
use record::BreakoutBoxRecord;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors surfaced to the caller before or instead of extraction
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("History window of {requested} days exceeds provider limit of {limit} days")]
    HistoryWindowTooLong { requested: u32, limit: u32 },

    #[error("No data returned for ticker {ticker}")]
    NoData { ticker: String },

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },

    #[error("Candles out of order at index {index}")]
    Unordered { index: usize },

    #[error("Candle source failed: {0}")]
    Source(String),
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core candle data trait
pub trait Ohlc {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Extension trait with consistency checks for candle data
pub trait OhlcExt: Ohlc {
    /// Validate candle consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(ExtractError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(ExtractError::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(ExtractError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: Ohlc> OhlcExt for T {}

/// Plain candle, as delivered by a market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }
}

impl Ohlc for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// ============================================================
// DIRECTION
// ============================================================

/// Side of a breakout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Up,
    Down,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }

    /// True if `price` lies strictly past `level` in this direction
    #[inline]
    pub fn beyond(self, price: f64, level: f64) -> bool {
        match self {
            Side::Up => price > level,
            Side::Down => price < level,
        }
    }

    /// True if `price` touches or passes `level` in this direction
    #[inline]
    pub fn reaches(self, price: f64, level: f64) -> bool {
        match self {
            Side::Up => price >= level,
            Side::Down => price <= level,
        }
    }

    /// High for up, low for down
    #[inline]
    pub fn extreme<T: Ohlc>(self, bar: &T) -> f64 {
        match self {
            Side::Up => bar.high(),
            Side::Down => bar.low(),
        }
    }

    /// Move `distance` away from `anchor` in this direction
    #[inline]
    pub fn offset(self, anchor: f64, distance: f64) -> f64 {
        match self {
            Side::Up => anchor + distance,
            Side::Down => anchor - distance,
        }
    }
}

/// Breakout direction as stored in records (`none`, `up`, `down`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::Up => Direction::Up,
            Side::Down => Direction::Down,
        }
    }
}

impl From<Option<Side>> for Direction {
    fn from(side: Option<Side>) -> Self {
        side.map_or(Direction::None, Direction::from)
    }
}

// ============================================================
// CANDLE SOURCE
// ============================================================

/// Market-data provider seam
pub trait CandleSource {
    type Candle: Ohlc;

    /// Fetch candles for the request, ascending by timestamp
    fn fetch(&self, request: &HistoryRequest) -> Result<Vec<Self::Candle>>;
}

// ============================================================
// EXTRACTOR
// ============================================================

/// Runs the box pipeline over candle series
#[derive(Debug, Clone)]
pub struct Extractor {
    config: SessionConfig,
}

impl Extractor {
    /// Create an extractor, validating the session windows
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ===========================================
    // LOW-LEVEL: Stages
    // ===========================================

    /// Split candles into local trading days.
    #[inline]
    pub fn partition<'a, T: Ohlc>(&self, candles: &'a [T]) -> Vec<TradingDay<'a, T>> {
        calendar::partition(candles, &self.config.timezone)
    }

    /// Run stages 2-8 on one day. `None` if the formation window is empty.
    #[inline]
    pub fn analyze_day<T: Ohlc>(&self, day: &TradingDay<'_, T>) -> Option<analysis::DayAnalysis> {
        analysis::analyze_day(&self.config, day)
    }

    /// Analyze one day and assemble its record.
    pub fn extract_day<T: Ohlc>(
        &self,
        ticker: &str,
        day: &TradingDay<'_, T>,
    ) -> Option<BreakoutBoxRecord> {
        self.analyze_day(day).map(|analysis| {
            BreakoutBoxRecord::assemble(ticker, self.config.dataset.as_deref(), &analysis)
        })
    }

    // ===========================================
    // HIGH-LEVEL: Batch processing
    // ===========================================

    /// Extract one record per trading day, in day order.
    pub fn extract<T: Ohlc>(&self, ticker: &str, candles: &[T]) -> Result<Vec<BreakoutBoxRecord>> {
        self.check_input(ticker, candles)?;

        let days = self.partition(candles);
        let records: Vec<_> = days
            .iter()
            .filter_map(|day| self.extract_day(ticker, day))
            .collect();

        tracing::info!(
            ticker,
            days = days.len(),
            records = records.len(),
            "extracted breakout boxes"
        );
        Ok(records)
    }

    /// Same output as [`extract`](Self::extract), days processed in parallel.
    pub fn extract_par<T: Ohlc + Sync>(
        &self,
        ticker: &str,
        candles: &[T],
    ) -> Result<Vec<BreakoutBoxRecord>> {
        self.check_input(ticker, candles)?;

        let days = self.partition(candles);
        let records: Vec<_> = days
            .par_iter()
            .filter_map(|day| self.extract_day(ticker, day))
            .collect();

        tracing::info!(
            ticker,
            days = days.len(),
            records = records.len(),
            "extracted breakout boxes (parallel)"
        );
        Ok(records)
    }

    /// Fetch history from a source and extract it.
    pub fn run<S: CandleSource>(
        &self,
        source: &S,
        request: &HistoryRequest,
    ) -> Result<Vec<BreakoutBoxRecord>> {
        let candles = source.fetch(request)?;
        self.extract(&request.ticker, &candles)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn check_input<T: Ohlc>(&self, ticker: &str, candles: &[T]) -> Result<()> {
        if candles.is_empty() {
            return Err(ExtractError::NoData {
                ticker: ticker.to_string(),
            });
        }
        if self.config.validate_data {
            validate_candles(candles)?;
        }
        Ok(())
    }
}

fn validate_candles<T: Ohlc>(candles: &[T]) -> Result<()> {
    for (i, candle) in candles.iter().enumerate() {
        candle.validate().map_err(|e| match e {
            ExtractError::InvalidCandle { reason, .. } => {
                ExtractError::InvalidCandle { index: i, reason }
            }
            other => other,
        })?;
    }
    if let Some(i) = candles
        .windows(2)
        .position(|w| w[1].timestamp() < w[0].timestamp())
    {
        return Err(ExtractError::Unordered { index: i + 1 });
    }
    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating Extractor instances
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    config: SessionConfig,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing (e.g. deserialized) configuration
    pub fn from_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Local civil zone of the exchange
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.config.timezone = tz;
        self
    }

    /// Closed formation window, local time
    pub fn formation_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.config.box_start = start;
        self.config.box_end = end;
        self
    }

    /// Last local time counted for targets and inverse detection
    pub fn cutoff(mut self, cutoff: NaiveTime) -> Self {
        self.config.cutoff = cutoff;
        self
    }

    /// Dataset tag for emitted records
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.config.dataset = Some(dataset.into());
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the extractor
    pub fn build(self) -> Result<Extractor> {
        Extractor::new(self.config)
    }
}

// ============================================================
// PARALLEL EXTRACTION
// ============================================================

use rayon::prelude::*;

/// Records extracted for a single instrument
#[derive(Debug)]
pub struct ExtractResult {
    pub ticker: String,
    pub records: Vec<BreakoutBoxRecord>,
}

/// Error from extracting a single instrument
#[derive(Debug)]
pub struct ExtractFailure {
    pub ticker: String,
    pub error: ExtractError,
}

/// Parallel extraction over multiple instruments
pub fn extract_parallel<'a, T, I>(
    extractor: &Extractor,
    instruments: I,
) -> (Vec<ExtractResult>, Vec<ExtractFailure>)
where
    T: Ohlc + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(ticker, candles)| {
            extractor
                .extract(ticker, candles)
                .map(|records| ExtractResult {
                    ticker: ticker.to_string(),
                    records,
                })
                .map_err(|error| ExtractFailure {
                    ticker: ticker.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => {
                tracing::warn!(ticker = %e.ticker, error = %e.error, "extraction failed");
                errors.push(e);
            }
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
