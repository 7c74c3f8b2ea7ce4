//! Property tests for the box pipeline invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Europe::Rome;
use ivbox::prelude::*;
use proptest::prelude::*;

/// 5-minute bars from 15:00 Rome, driven by a random walk
fn walk(steps: &[(f64, f64, f64)]) -> Vec<Candle> {
    let start: DateTime<Utc> = Rome
        .with_ymd_and_hms(2024, 3, 5, 15, 0, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc);

    let mut price = 100.0;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(delta, up, down))| {
            let open = price;
            let close = (price + delta).max(1.0);
            price = close;
            Candle::new(
                start + Duration::minutes(5 * i as i64),
                open,
                open.max(close) + up,
                open.min(close) - down,
                close,
            )
        })
        .collect()
}

fn steps() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-1.5f64..1.5, 0.0f64..1.0, 0.0f64..0.9), 1..104)
}

proptest! {
    #[test]
    fn prop_one_record_iff_formation_candles(steps in steps()) {
        let candles = walk(&steps);
        let records = ExtractorBuilder::new().build().unwrap().extract("NQ=F", &candles).unwrap();
        // bar 6 is the 15:30 candle
        let expected = if candles.len() > 6 { 1 } else { 0 };
        prop_assert_eq!(records.len(), expected);
    }

    #[test]
    fn prop_box_ordering(steps in steps()) {
        let candles = walk(&steps);
        let records = ExtractorBuilder::new().build().unwrap().extract("NQ=F", &candles).unwrap();
        for r in &records {
            prop_assert!(r.initial_high_box >= r.initial_low_box);
            prop_assert!(r.high_box >= r.initial_high_box);
            prop_assert!(r.low_box <= r.initial_low_box);
            prop_assert!(r.start_time <= r.end_time);
        }
    }

    #[test]
    fn prop_dependent_fields_follow_their_stage(steps in steps()) {
        let candles = walk(&steps);
        let records = ExtractorBuilder::new().build().unwrap().extract("NQ=F", &candles).unwrap();
        for r in &records {
            if r.breakout == Direction::None {
                prop_assert!(r.breakout_time.is_none());
                prop_assert!(!r.confirm);
            } else {
                prop_assert!(r.breakout_time.is_some());
            }

            if r.confirm {
                prop_assert!(r.confirm_time > r.breakout_time);
            } else {
                prop_assert!(r.confirm_time.is_none());
                prop_assert!(!(r.target_05_hit || r.target_068_hit || r.target_100_hit || r.target_200_hit));
                prop_assert_eq!(r.max_extension_up, 0.0);
                prop_assert_eq!(r.max_extension_down, 0.0);
                prop_assert_eq!(r.inverse_breakout, Direction::None);
            }

            if r.inverse_breakout == Direction::None {
                prop_assert!(r.inverse_breakout_time.is_none());
                prop_assert!(!r.inv_confirm);
            } else {
                prop_assert!(r.inverse_breakout != r.breakout);
                prop_assert!(r.inverse_breakout_time > r.confirm_time);
            }

            if r.inv_confirm {
                prop_assert!(r.inv_confirm_time > r.inverse_breakout_time);
            } else {
                prop_assert!(!(r.inv_target_05_hit
                    || r.inv_target_068_hit
                    || r.inv_target_100_hit
                    || r.inv_target_200_hit));
            }
        }
    }

    #[test]
    fn prop_further_targets_imply_nearer(steps in steps()) {
        let candles = walk(&steps);
        let records = ExtractorBuilder::new().build().unwrap().extract("NQ=F", &candles).unwrap();
        for r in &records {
            prop_assert!(!r.target_068_hit || r.target_05_hit);
            prop_assert!(!r.target_200_hit || r.target_100_hit);
            prop_assert!(!r.inv_target_068_hit || r.inv_target_05_hit);
            prop_assert!(!r.inv_target_200_hit || r.inv_target_100_hit);
        }
    }

    #[test]
    fn prop_range_frozen_at_breakout(steps in steps()) {
        let candles = walk(&steps);
        let extractor = ExtractorBuilder::new().build().unwrap();
        for day in extractor.partition(&candles) {
            let Some(analysis) = extractor.analyze_day(&day) else { continue };
            let Some(forward) = analysis.forward else { continue };
            prop_assert_eq!(analysis.range, forward.breakout.range);
            let side = forward.breakout.side;
            // the breaking close lies beyond the frozen edge
            let breaking = day.bars.iter().find(|b| b.local() == forward.breakout.time).unwrap();
            prop_assert!(side.beyond(breaking.close(), analysis.range.edge(side)));
        }
    }

    #[test]
    fn prop_ratchet_is_monotonic(steps in steps(), up in any::<bool>()) {
        let candles = walk(&steps);
        let extractor = ExtractorBuilder::new().build().unwrap();
        let side = if up { Side::Up } else { Side::Down };

        for day in extractor.partition(&candles) {
            let mut pending = Pending { side, level_to_break: 100.0 };
            for bar in &day.bars {
                match pending.step(bar) {
                    Transition::Continue(next) => {
                        prop_assert!(side.reaches(next.level_to_break, pending.level_to_break));
                        pending = next;
                    }
                    Transition::Emit(confirmation) => {
                        prop_assert!(side.beyond(confirmation.price, pending.level_to_break));
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn prop_parallel_matches_sequential(steps in steps()) {
        let candles = walk(&steps);
        let extractor = ExtractorBuilder::new().build().unwrap();
        let seq = extractor.extract("NQ=F", &candles).unwrap();
        let par = extractor.extract_par("NQ=F", &candles).unwrap();
        prop_assert_eq!(seq, par);
    }
}
