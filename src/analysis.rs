//! Per-day pipeline: box, breakout, confirmation, targets, then the inverse leg

use chrono::{NaiveDate, NaiveTime};

use crate::{
    calendar::{SessionBar, TradingDay},
    config::SessionConfig,
    detectors::{
        detect_breakout, detect_inverse, track_confirmation, BoxRange, Breakout,
        ConfirmationState, OpeningBox, TargetOutcome,
    },
    Ohlc,
};

/// One directional leg: a breakout and what followed it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub breakout: Breakout,
    pub confirmation: ConfirmationState,
    /// Present only when the leg was confirmed
    pub targets: Option<TargetOutcome>,
}

/// Everything detected on one trading day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAnalysis {
    pub date: NaiveDate,
    pub opening_box: OpeningBox,
    /// Box extremes after widening; frozen at the breakout if there was one
    pub range: BoxRange,
    pub forward: Option<Leg>,
    /// Only searched after a confirmed forward leg
    pub inverse: Option<Leg>,
}

/// Run every stage on one day.
///
/// Returns `None` when the formation window holds no candle.
pub fn analyze_day<T: Ohlc>(config: &SessionConfig, day: &TradingDay<'_, T>) -> Option<DayAnalysis> {
    let Some(opening_box) = OpeningBox::form(day, config) else {
        tracing::trace!(date = %day.date, bars = day.bars.len(), "no formation candles, day skipped");
        return None;
    };

    let post_window = day.bars_after(config.box_end);
    let (state, after_breakout) = detect_breakout(BoxRange::from(&opening_box), post_window);

    let mut analysis = DayAnalysis {
        date: day.date,
        opening_box,
        range: state.range(),
        forward: None,
        inverse: None,
    };

    let Some(&breakout) = state.breakout() else {
        return Some(analysis);
    };
    tracing::debug!(date = %day.date, side = ?breakout.side, time = %breakout.time, "breakout");

    let (forward, window) = run_leg(config, &opening_box, breakout, after_breakout);
    analysis.forward = Some(forward);

    if !forward.confirmation.is_confirmed() {
        return Some(analysis);
    }

    if let Some((inverse, after_inverse)) = detect_inverse(&breakout, window) {
        tracing::debug!(date = %day.date, side = ?inverse.side, time = %inverse.time, "inverse breakout");
        let (leg, _) = run_leg(config, &opening_box, inverse, after_inverse);
        analysis.inverse = Some(leg);
    }

    Some(analysis)
}

/// Confirm a breakout over `bars`, then evaluate targets over the bars after the
/// confirming candle up to the cutoff. Returns the leg and that target window.
fn run_leg<'s, 'a, T: Ohlc>(
    config: &SessionConfig,
    opening_box: &OpeningBox,
    breakout: Breakout,
    bars: &'s [SessionBar<'a, T>],
) -> (Leg, &'s [SessionBar<'a, T>]) {
    let (confirmation, after_confirmation) = track_confirmation(&breakout, bars);
    let window = until_cutoff(after_confirmation, config.cutoff);

    let targets = confirmation.confirmation().map(|c| {
        tracing::debug!(side = ?breakout.side, time = %c.time, price = c.price, "confirmed");
        TargetOutcome::evaluate(breakout.side, opening_box, c.price, window)
    });

    (
        Leg {
            breakout,
            confirmation,
            targets,
        },
        window,
    )
}

/// Prefix of `bars` with local time at or before `cutoff`
fn until_cutoff<'s, 'a, T: Ohlc>(
    bars: &'s [SessionBar<'a, T>],
    cutoff: NaiveTime,
) -> &'s [SessionBar<'a, T>] {
    let end = bars.partition_point(|b| b.time() <= cutoff);
    &bars[..end]
}
