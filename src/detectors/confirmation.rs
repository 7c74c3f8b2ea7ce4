//! Confirmation tracking
//!
//! After a breakout the level to break starts at the breaking candle's extreme.
//! A later close beyond it confirms; a wick beyond it without the close drags the
//! level along (up: only rises, down: only falls).

use chrono::DateTime;
use chrono_tz::Tz;

use super::{breakout::Breakout, scan, Scan, Transition};
use crate::{calendar::SessionBar, Ohlc, Side};

/// A close beyond the ratcheted level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confirmation {
    /// Local instant of the confirming candle
    pub time: DateTime<Tz>,
    /// Close of the confirming candle
    pub price: f64,
    /// Level the close broke
    pub level_to_break: f64,
}

/// Unconfirmed tracker state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pending {
    pub side: Side,
    pub level_to_break: f64,
}

impl Pending {
    pub fn new(breakout: &Breakout) -> Self {
        Self {
            side: breakout.side,
            level_to_break: breakout.level_to_break,
        }
    }

    /// Confirm on close, otherwise ratchet on the candle's extreme.
    pub fn step<T: Ohlc>(self, bar: &SessionBar<'_, T>) -> Transition<Self, Confirmation> {
        let close = bar.close();
        if self.side.beyond(close, self.level_to_break) {
            return Transition::Emit(Confirmation {
                time: bar.local(),
                price: close,
                level_to_break: self.level_to_break,
            });
        }

        let extreme = self.side.extreme(bar);
        if self.side.beyond(extreme, self.level_to_break) {
            Transition::Continue(Self {
                level_to_break: extreme,
                ..self
            })
        } else {
            Transition::Continue(self)
        }
    }
}

/// State of a confirmation tracker once its scan is over
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmationState {
    Unconfirmed { level_to_break: f64 },
    Confirmed(Confirmation),
}

impl ConfirmationState {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationState::Confirmed(_))
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match self {
            ConfirmationState::Confirmed(c) => Some(c),
            ConfirmationState::Unconfirmed { .. } => None,
        }
    }

    /// Final level: the one broken, or the last ratcheted value
    pub fn level_to_break(&self) -> f64 {
        match self {
            ConfirmationState::Confirmed(c) => c.level_to_break,
            ConfirmationState::Unconfirmed { level_to_break } => *level_to_break,
        }
    }
}

/// Track confirmation of `breakout` over the bars following it.
///
/// Returns the final state and the bars after the confirming candle (empty
/// when unconfirmed).
pub fn track_confirmation<'s, 'a, T: Ohlc>(
    breakout: &Breakout,
    bars: &'s [SessionBar<'a, T>],
) -> (ConfirmationState, &'s [SessionBar<'a, T>]) {
    match scan(Pending::new(breakout), bars, |pending, bar| pending.step(bar)) {
        Scan::Emitted { event, rest } => (ConfirmationState::Confirmed(event), rest),
        Scan::Exhausted(pending) => (
            ConfirmationState::Unconfirmed {
                level_to_break: pending.level_to_break,
            },
            &bars[bars.len()..],
        ),
    }
}
