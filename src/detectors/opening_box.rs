//! Box Former: the range printed during the formation window

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{calendar::TradingDay, config::SessionConfig, Ohlc, Side};

// ============================================================
// OPENING BOX
// ============================================================

/// Extremes of the formation-window candles. Fixed once formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningBox {
    pub initial_high: f64,
    pub initial_low: f64,
    /// Local time of the first formation candle
    pub start_time: NaiveTime,
    /// Local time of the last formation candle
    pub end_time: NaiveTime,
}

impl OpeningBox {
    /// Form the box from the day's formation-window candles.
    /// Returns `None` when the window holds no candle.
    pub fn form<T: Ohlc>(day: &TradingDay<'_, T>, config: &SessionConfig) -> Option<Self> {
        let mut window = day
            .bars
            .iter()
            .filter(|b| config.in_formation_window(b.time()));

        let first = window.next()?;
        let (initial_high, initial_low, last) = window.fold(
            (first.high(), first.low(), first),
            |(high, low, _), b| (high.max(b.high()), low.min(b.low()), b),
        );

        Some(Self {
            initial_high,
            initial_low,
            start_time: first.time(),
            end_time: last.time(),
        })
    }

    /// `initial_high - initial_low`
    #[inline]
    pub fn range(&self) -> f64 {
        self.initial_high - self.initial_low
    }

    /// Extreme targets are measured from: high for up, low for down
    #[inline]
    pub fn anchor(&self, side: Side) -> f64 {
        match side {
            Side::Up => self.initial_high,
            Side::Down => self.initial_low,
        }
    }
}

// ============================================================
// BOX RANGE
// ============================================================

/// Running box extremes used for breakout detection.
///
/// Starts at the opening box and widens with every post-window candle that
/// does not break it; frozen once a breakout fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRange {
    pub high: f64,
    pub low: f64,
}

impl BoxRange {
    /// Absorb a candle's high/low
    #[inline]
    pub fn widen<T: Ohlc>(self, bar: &T) -> Self {
        Self {
            high: self.high.max(bar.high()),
            low: self.low.min(bar.low()),
        }
    }

    /// Edge a close must cross to break in `side`
    #[inline]
    pub fn edge(&self, side: Side) -> f64 {
        match side {
            Side::Up => self.high,
            Side::Down => self.low,
        }
    }
}

impl From<&OpeningBox> for BoxRange {
    fn from(b: &OpeningBox) -> Self {
        Self {
            high: b.initial_high,
            low: b.initial_low,
        }
    }
}
