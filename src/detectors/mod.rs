//! Stage detectors of the box pipeline
//!
//! Every stage is a small state machine driven candle by candle:
//!
//! - **Opening box**: formation-window extremes
//! - **Breakout**: first close beyond the (widening) box, and the inverse breakout
//! - **Confirmation**: close beyond a ratcheting level
//! - **Targets**: extension levels and their hit flags
//!
//! Stages share [`scan`], which feeds bars to a transition function until it emits
//! an event and hands back the bars that were not consumed.

pub mod breakout;
pub mod confirmation;
pub mod opening_box;
pub mod targets;

pub use breakout::*;
pub use confirmation::*;
pub use opening_box::*;
pub use targets::*;

/// Result of feeding one bar to a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition<S, E> {
    /// Keep scanning with the next state
    Continue(S),
    /// The stage fired; scanning stops
    Emit(E),
}

/// Outcome of a whole scan
#[derive(Debug, PartialEq)]
pub enum Scan<'s, B, S, E> {
    /// Event plus the bars after the one that produced it
    Emitted { event: E, rest: &'s [B] },
    /// Bars ran out; final state
    Exhausted(S),
}

/// Drive `step` over `bars` until it emits.
pub fn scan<'s, B, S, E>(
    mut state: S,
    bars: &'s [B],
    mut step: impl FnMut(S, &B) -> Transition<S, E>,
) -> Scan<'s, B, S, E> {
    for (i, bar) in bars.iter().enumerate() {
        match step(state, bar) {
            Transition::Continue(next) => state = next,
            Transition::Emit(event) => {
                return Scan::Emitted {
                    event,
                    rest: &bars[i + 1..],
                }
            }
        }
    }
    Scan::Exhausted(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_sum(limit: i32) -> impl FnMut(i32, &i32) -> Transition<i32, i32> {
        move |acc, x| {
            let acc = acc + x;
            if acc > limit {
                Transition::Emit(acc)
            } else {
                Transition::Continue(acc)
            }
        }
    }

    #[test]
    fn test_scan_emits_with_rest() {
        let bars = [1, 2, 3, 4, 5];
        match scan(0, &bars, running_sum(5)) {
            Scan::Emitted { event, rest } => {
                assert_eq!(event, 6);
                assert_eq!(rest, &[4, 5]);
            }
            Scan::Exhausted(_) => panic!("expected emission"),
        }
    }

    #[test]
    fn test_scan_emit_on_last_bar_leaves_empty_rest() {
        let bars = [1, 2, 3];
        let none: &[i32] = &[];
        assert_eq!(
            scan(0, &bars, running_sum(5)),
            Scan::Emitted {
                event: 6,
                rest: none
            }
        );
    }

    #[test]
    fn test_scan_exhausts() {
        let bars = [1, 1, 1];
        assert_eq!(scan(0, &bars, running_sum(5)), Scan::Exhausted(3));

        let empty: [i32; 0] = [];
        assert_eq!(scan(7, &empty, running_sum(5)), Scan::Exhausted(7));
    }
}
