//! Day partitioning in the exchange's local civil time

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::Ohlc;

/// A candle seen through the session's local clock
#[derive(Debug)]
pub struct SessionBar<'a, T> {
    candle: &'a T,
    local: DateTime<Tz>,
}

impl<T> Clone for SessionBar<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SessionBar<'_, T> {}

impl<'a, T: Ohlc> SessionBar<'a, T> {
    pub fn new(candle: &'a T, tz: &Tz) -> Self {
        Self {
            candle,
            local: candle.timestamp().with_timezone(tz),
        }
    }

    #[inline]
    pub fn candle(&self) -> &'a T {
        self.candle
    }

    /// Instant in the local zone
    #[inline]
    pub fn local(&self) -> DateTime<Tz> {
        self.local
    }

    /// Local time-of-day
    #[inline]
    pub fn time(&self) -> NaiveTime {
        self.local.time()
    }
}

impl<T: Ohlc> Ohlc for SessionBar<'_, T> {
    fn open(&self) -> f64 {
        self.candle.open()
    }

    fn high(&self) -> f64 {
        self.candle.high()
    }

    fn low(&self) -> f64 {
        self.candle.low()
    }

    fn close(&self) -> f64 {
        self.candle.close()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.candle.timestamp()
    }
}

/// All candles of one local calendar date, ascending by timestamp
#[derive(Debug, Clone)]
pub struct TradingDay<'a, T> {
    pub date: NaiveDate,
    pub bars: Vec<SessionBar<'a, T>>,
}

impl<'a, T: Ohlc> TradingDay<'a, T> {
    /// Bars whose local time is strictly after `after`.
    ///
    /// Local time-of-day never decreases past the DST switch hours, so the
    /// matching bars always form a suffix of the day.
    pub fn bars_after(&self, after: NaiveTime) -> &[SessionBar<'a, T>] {
        let start = self.bars.partition_point(|b| b.time() <= after);
        &self.bars[start..]
    }
}

/// Group candles into trading days of the given zone.
///
/// Order inside a day follows input order; days come out ascending by date.
/// Every candle lands in exactly one day.
pub fn partition<'a, T: Ohlc>(candles: &'a [T], tz: &Tz) -> Vec<TradingDay<'a, T>> {
    let mut days: BTreeMap<NaiveDate, Vec<SessionBar<'a, T>>> = BTreeMap::new();

    for candle in candles {
        let bar = SessionBar::new(candle, tz);
        days.entry(bar.local.date_naive()).or_default().push(bar);
    }

    days.into_iter()
        .map(|(date, bars)| TradingDay { date, bars })
        .collect()
}
