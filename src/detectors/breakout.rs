//! Breakout detection (forward and inverse)
//!
//! Forward: the first post-window close beyond the running box. Until it happens
//! the box absorbs every candle's high/low; the breakout freezes it.
//!
//! Inverse: after a confirmed breakout, the first close beyond the frozen box edge
//! on the opposite side.

use chrono::DateTime;
use chrono_tz::Tz;

use super::{opening_box::BoxRange, scan, Scan, Transition};
use crate::{calendar::SessionBar, Direction, Ohlc, Side};

// ============================================================
// BREAKOUT EVENT
// ============================================================

/// A close beyond the box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakout {
    pub side: Side,
    /// Local instant of the breaking candle
    pub time: DateTime<Tz>,
    /// Breaking candle's high (up) or low (down); seeds confirmation
    pub level_to_break: f64,
    /// Box extremes at the breakout instant
    pub range: BoxRange,
}

impl Breakout {
    fn at<T: Ohlc>(side: Side, bar: &SessionBar<'_, T>, range: BoxRange) -> Self {
        Self {
            side,
            time: bar.local(),
            level_to_break: side.extreme(bar),
            range,
        }
    }
}

// ============================================================
// FORWARD BREAKOUT
// ============================================================

/// State of the forward breakout detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakoutState {
    NotBroken { range: BoxRange },
    Broken(Breakout),
}

impl BreakoutState {
    /// Box extremes: still widening if not broken, frozen otherwise
    pub fn range(&self) -> BoxRange {
        match self {
            BreakoutState::NotBroken { range } => *range,
            BreakoutState::Broken(b) => b.range,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            BreakoutState::NotBroken { .. } => Direction::None,
            BreakoutState::Broken(b) => b.side.into(),
        }
    }

    pub fn breakout(&self) -> Option<&Breakout> {
        match self {
            BreakoutState::NotBroken { .. } => None,
            BreakoutState::Broken(b) => Some(b),
        }
    }
}

/// `NotBroken` transition: break on close, otherwise widen.
pub fn breakout_step<T: Ohlc>(
    range: BoxRange,
    bar: &SessionBar<'_, T>,
) -> Transition<BoxRange, Breakout> {
    let close = bar.close();
    if close > range.high {
        Transition::Emit(Breakout::at(Side::Up, bar, range))
    } else if close < range.low {
        Transition::Emit(Breakout::at(Side::Down, bar, range))
    } else {
        Transition::Continue(range.widen(bar))
    }
}

/// Scan post-window bars for the first breakout.
///
/// Returns the final state and the bars after the breaking candle (empty if
/// the day never broke).
pub fn detect_breakout<'s, 'a, T: Ohlc>(
    range: BoxRange,
    bars: &'s [SessionBar<'a, T>],
) -> (BreakoutState, &'s [SessionBar<'a, T>]) {
    match scan(range, bars, |range, bar| breakout_step(range, bar)) {
        Scan::Emitted { event, rest } => (BreakoutState::Broken(event), rest),
        Scan::Exhausted(range) => (BreakoutState::NotBroken { range }, &bars[bars.len()..]),
    }
}

// ============================================================
// INVERSE BREAKOUT
// ============================================================

/// Scan the post-confirmation window for a close beyond the opposite edge.
///
/// Only the first such candle counts; its extreme seeds the inverse level.
pub fn detect_inverse<'s, 'a, T: Ohlc>(
    breakout: &Breakout,
    window: &'s [SessionBar<'a, T>],
) -> Option<(Breakout, &'s [SessionBar<'a, T>])> {
    let side = breakout.side.opposite();
    let range = breakout.range;
    let edge = range.edge(side);

    let found = scan((), window, |(), bar| {
        if side.beyond(bar.close(), edge) {
            Transition::Emit(Breakout::at(side, bar, range))
        } else {
            Transition::Continue(())
        }
    });

    match found {
        Scan::Emitted { event, rest } => Some((event, rest)),
        Scan::Exhausted(()) => None,
    }
}
