//! Record Assembler: one flat row per trading day

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{DayAnalysis, Leg},
    detectors::{Extension, TargetHits},
    Direction,
};

/// Breakout box snapshot for one instrument and day.
///
/// Times are local wall-clock times of the configured zone. Fields of a stage
/// that did not happen keep their defaults (`none`, `false`, `None`, `0.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutBoxRecord {
    pub ticker: String,
    pub dataset: Option<String>,
    pub date: NaiveDate,

    // Box
    pub high_box: f64,
    pub low_box: f64,
    pub initial_high_box: f64,
    pub initial_low_box: f64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    // Forward leg
    pub breakout: Direction,
    pub breakout_time: Option<NaiveTime>,
    pub confirm: bool,
    pub confirm_time: Option<NaiveTime>,
    pub target_05_hit: bool,
    pub target_068_hit: bool,
    pub target_100_hit: bool,
    pub target_200_hit: bool,
    pub max_extension_up: f64,
    pub max_extension_down: f64,

    // Inverse leg
    pub inverse_breakout: Direction,
    pub inverse_breakout_time: Option<NaiveTime>,
    pub inv_confirm: bool,
    pub inv_confirm_time: Option<NaiveTime>,
    pub inv_target_05_hit: bool,
    pub inv_target_068_hit: bool,
    pub inv_target_100_hit: bool,
    pub inv_target_200_hit: bool,
    pub max_extension_inv_up: f64,
    pub max_extension_inv_down: f64,
}

/// Upsert key of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub ticker: String,
    pub date: NaiveDate,
    pub dataset: Option<String>,
}

/// Flattened view of an optional leg
#[derive(Default)]
struct LegFields {
    direction: Direction,
    breakout_time: Option<NaiveTime>,
    confirm: bool,
    confirm_time: Option<NaiveTime>,
    hits: TargetHits,
    extension: Extension,
}

impl From<Option<&Leg>> for LegFields {
    fn from(leg: Option<&Leg>) -> Self {
        let Some(leg) = leg else {
            return Self::default();
        };
        let confirmation = leg.confirmation.confirmation();
        Self {
            direction: leg.breakout.side.into(),
            breakout_time: Some(leg.breakout.time.time()),
            confirm: confirmation.is_some(),
            confirm_time: confirmation.map(|c| c.time.time()),
            hits: leg.targets.map(|t| t.hits).unwrap_or_default(),
            extension: leg.targets.map(|t| t.extension).unwrap_or_default(),
        }
    }
}

impl BreakoutBoxRecord {
    /// Package a day's analysis
    pub fn assemble(ticker: &str, dataset: Option<&str>, analysis: &DayAnalysis) -> Self {
        let forward = LegFields::from(analysis.forward.as_ref());
        let inverse = LegFields::from(analysis.inverse.as_ref());
        let opening_box = &analysis.opening_box;

        Self {
            ticker: ticker.to_string(),
            dataset: dataset.map(str::to_string),
            date: analysis.date,

            high_box: analysis.range.high,
            low_box: analysis.range.low,
            initial_high_box: opening_box.initial_high,
            initial_low_box: opening_box.initial_low,
            start_time: opening_box.start_time,
            end_time: opening_box.end_time,

            breakout: forward.direction,
            breakout_time: forward.breakout_time,
            confirm: forward.confirm,
            confirm_time: forward.confirm_time,
            target_05_hit: forward.hits.target_05,
            target_068_hit: forward.hits.target_068,
            target_100_hit: forward.hits.target_100,
            target_200_hit: forward.hits.target_200,
            max_extension_up: forward.extension.up,
            max_extension_down: forward.extension.down,

            inverse_breakout: inverse.direction,
            inverse_breakout_time: inverse.breakout_time,
            inv_confirm: inverse.confirm,
            inv_confirm_time: inverse.confirm_time,
            inv_target_05_hit: inverse.hits.target_05,
            inv_target_068_hit: inverse.hits.target_068,
            inv_target_100_hit: inverse.hits.target_100,
            inv_target_200_hit: inverse.hits.target_200,
            max_extension_inv_up: inverse.extension.up,
            max_extension_inv_down: inverse.extension.down,
        }
    }

    /// `(ticker, date, dataset)`: one record per key
    pub fn key(&self) -> RecordKey {
        RecordKey {
            ticker: self.ticker.clone(),
            date: self.date,
            dataset: self.dataset.clone(),
        }
    }
}
