//! Extension targets after a confirmed breakout

use serde::{Deserialize, Serialize};

use super::opening_box::OpeningBox;
use crate::{calendar::SessionBar, Ohlc, Side};

/// First target: 0.5% of the confirmation price beyond the box
pub const TARGET_05_PCT: f64 = 0.005;
/// Second target: 0.68% of the confirmation price beyond the box
pub const TARGET_068_PCT: f64 = 0.0068;
/// Third target: one box range beyond the box
pub const TARGET_100_MULT: f64 = 1.0;
/// Fourth target: two box ranges beyond the box
pub const TARGET_200_MULT: f64 = 2.0;

// ============================================================
// TARGET SET
// ============================================================

/// Four absolute price levels measured from the box edge on the breakout side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub side: Side,
    pub target_05: f64,
    pub target_068: f64,
    pub target_100: f64,
    pub target_200: f64,
}

impl TargetSet {
    /// Up targets sit above `initial_high`, down targets below `initial_low`.
    pub fn new(side: Side, opening_box: &OpeningBox, confirm_price: f64) -> Self {
        let anchor = opening_box.anchor(side);
        let range = opening_box.range();
        Self {
            side,
            target_05: side.offset(anchor, confirm_price * TARGET_05_PCT),
            target_068: side.offset(anchor, confirm_price * TARGET_068_PCT),
            target_100: side.offset(anchor, range * TARGET_100_MULT),
            target_200: side.offset(anchor, range * TARGET_200_MULT),
        }
    }

    /// Test every level against one candle
    pub fn hits<T: Ohlc>(&self, bar: &T) -> TargetHits {
        let extreme = self.side.extreme(bar);
        TargetHits {
            target_05: self.side.reaches(extreme, self.target_05),
            target_068: self.side.reaches(extreme, self.target_068),
            target_100: self.side.reaches(extreme, self.target_100),
            target_200: self.side.reaches(extreme, self.target_200),
        }
    }

    /// Accumulate hits over a window. Flags only ever turn on.
    pub fn evaluate<T: Ohlc>(&self, window: &[SessionBar<'_, T>]) -> TargetHits {
        window
            .iter()
            .fold(TargetHits::default(), |acc, bar| acc.merge(self.hits(bar)))
    }
}

/// Which levels were touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHits {
    pub target_05: bool,
    pub target_068: bool,
    pub target_100: bool,
    pub target_200: bool,
}

impl TargetHits {
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            target_05: self.target_05 || other.target_05,
            target_068: self.target_068 || other.target_068,
            target_100: self.target_100 || other.target_100,
            target_200: self.target_200 || other.target_200,
        }
    }
}

// ============================================================
// EXTENSION RATIOS
// ============================================================

/// Furthest excursion beyond the box in box-range units, rounded to 2 decimals.
///
/// Auxiliary measure; 0 on a zero-height box or an empty window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    /// `(max_high - initial_high) / range`
    pub up: f64,
    /// `(initial_low - min_low) / range`
    pub down: f64,
}

impl Extension {
    pub fn measure<T: Ohlc>(opening_box: &OpeningBox, window: &[SessionBar<'_, T>]) -> Self {
        let range = opening_box.range();
        if range == 0.0 || window.is_empty() {
            return Self::default();
        }

        let (max_high, min_low) = window.iter().fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(high, low), bar| (high.max(bar.high()), low.min(bar.low())),
        );

        Self {
            up: round2((max_high - opening_box.initial_high) / range),
            down: round2((opening_box.initial_low - min_low) / range),
        }
    }
}

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ============================================================
// TARGET OUTCOME
// ============================================================

/// Targets, hits and extension measured over one post-confirmation window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetOutcome {
    pub targets: TargetSet,
    pub hits: TargetHits,
    pub extension: Extension,
}

impl TargetOutcome {
    pub fn evaluate<T: Ohlc>(
        side: Side,
        opening_box: &OpeningBox,
        confirm_price: f64,
        window: &[SessionBar<'_, T>],
    ) -> Self {
        let targets = TargetSet::new(side, opening_box, confirm_price);
        Self {
            targets,
            hits: targets.evaluate(window),
            extension: Extension::measure(opening_box, window),
        }
    }
}
