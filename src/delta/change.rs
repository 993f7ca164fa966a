//! Full-book delta of best-level volume changes, carried across bars

use parking_lot::Mutex;
use tracing::trace;

use super::{DeltaIndicator, DepthOutcome, IndicatorKind};
use crate::orderbook::{DepthBook, DepthEvent};

#[derive(Debug, Default)]
struct ChangeState {
    cumulative_delta: f64,
    last_best_bid_volume: i64,
    last_best_ask_volume: i64,
}

/// Tracks every row of both sides and adds
/// `(ask volume change) - (bid volume change)` at the best level after each
/// depth event, once both sides have a positive best volume.
///
/// Lock order is accumulator state, then a side. Book mutation takes only
/// the side lock.
#[derive(Debug, Default)]
pub struct ChangeDelta {
    book: DepthBook,
    state: Mutex<ChangeState>,
}

impl ChangeDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self) -> &DepthBook {
        &self.book
    }

    fn recompute(&self) -> Option<f64> {
        let mut state = self.state.lock();
        let (bid, ask) = self.book.best_volumes();

        if bid == 0 || ask == 0 {
            return None;
        }

        let bid_change = bid - state.last_best_bid_volume;
        let ask_change = ask - state.last_best_ask_volume;

        // Volumes are non-negative so each change fits in i64; their
        // difference and the running total may not.
        state.cumulative_delta += ask_change as f64 - bid_change as f64;
        state.last_best_bid_volume = bid;
        state.last_best_ask_volume = ask;

        trace!(
            bid_change,
            ask_change,
            cumulative_delta = state.cumulative_delta,
            "Best level volume changed"
        );

        Some(state.cumulative_delta)
    }
}

impl DeltaIndicator for ChangeDelta {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Change
    }

    fn on_market_depth(&self, event: &DepthEvent) -> DepthOutcome {
        if !self.book.apply(event).is_applied() {
            trace!(
                side = event.side.as_str(),
                operation = event.operation.as_str(),
                position = event.position,
                "Dropped out of range depth event"
            );
            return DepthOutcome::rejected();
        }

        DepthOutcome::accepted(self.recompute())
    }

    fn on_bar_update(&self, _is_first_tick_of_bar: bool) -> f64 {
        // The total is never reset on a new bar; the first tick repeats the
        // previous bar's last value.
        self.value()
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        self.book.clear();
        *state = ChangeState::default();
    }

    fn value(&self) -> f64 {
        self.state.lock().cumulative_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::{DepthOperation, Side};
    use std::sync::Arc;
    use std::thread;

    fn event(side: Side, operation: DepthOperation, position: usize, volume: i64) -> DepthEvent {
        DepthEvent::new(side, operation, position, 100.0, volume)
    }

    fn warmed_up() -> ChangeDelta {
        let delta = ChangeDelta::new();
        delta.on_market_depth(&event(Side::Bid, DepthOperation::Add, 0, 50));
        delta.on_market_depth(&event(Side::Ask, DepthOperation::Add, 0, 30));
        delta
    }

    #[test]
    fn test_first_recompute_counts_from_zero() {
        let delta = ChangeDelta::new();

        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Add, 0, 50));
        assert!(outcome.accepted);
        assert_eq!(outcome.published, None);

        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Add, 0, 30));
        assert_eq!(outcome.published, Some(-20.0));
    }

    #[test]
    fn test_ask_update_adds_ask_change() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Update, 0, 45));

        assert_eq!(outcome.published, Some(-5.0));
        assert_eq!(delta.value(), -5.0);
    }

    #[test]
    fn test_bid_increase_is_negative() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Update, 0, 70));
        assert_eq!(outcome.published, Some(-40.0));
    }

    #[test]
    fn test_identical_update_adds_nothing() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Update, 0, 50));

        assert_eq!(outcome.published, Some(-20.0));
        assert_eq!(delta.value(), -20.0);
    }

    #[test]
    fn test_deeper_rows_only_count_when_promoted() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Add, 1, 90));
        assert_eq!(outcome.published, Some(-20.0));

        // Removing the best ask promotes the 90 lot row: ask change 90 - 30
        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Remove, 0, 0));
        assert_eq!(outcome.published, Some(40.0));
        assert_eq!(delta.book().best_volume(Side::Ask), 90);
    }

    #[test]
    fn test_empty_side_withholds_publication() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Remove, 0, 0));

        assert!(outcome.accepted);
        assert_eq!(outcome.published, None);
        assert_eq!(delta.value(), -20.0);

        // The last-seen bid is still 50, so a new 60 lot best bid changes by 10
        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Add, 0, 60));
        assert_eq!(outcome.published, Some(-30.0));
    }

    #[test]
    fn test_out_of_range_events_are_dropped() {
        let delta = warmed_up();
        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Update, 3, 999));

        assert!(!outcome.accepted);
        assert_eq!(outcome.published, None);
        assert_eq!(delta.value(), -20.0);
    }

    #[test]
    fn test_new_bar_carries_value_forward() {
        let delta = warmed_up();
        delta.on_market_depth(&event(Side::Ask, DepthOperation::Update, 0, 45));

        let before = delta.on_bar_update(false);
        let first_tick = delta.on_bar_update(true);
        assert_eq!(before, -5.0);
        assert_eq!(first_tick, before);
    }

    #[test]
    fn test_reset_clears_book_and_total() {
        let delta = warmed_up();
        delta.reset();

        assert_eq!(delta.value(), 0.0);
        assert_eq!(delta.book().best_volumes(), (0, 0));

        // Warm-up after reset counts from zero again
        let delta_after = {
            delta.on_market_depth(&event(Side::Bid, DepthOperation::Add, 0, 50));
            delta.on_market_depth(&event(Side::Ask, DepthOperation::Add, 0, 30))
        };
        assert_eq!(delta_after.published, Some(-20.0));
    }

    #[test]
    fn test_extreme_volumes_do_not_overflow() {
        let delta = ChangeDelta::new();
        delta.on_market_depth(&event(Side::Bid, DepthOperation::Add, 0, i64::MAX));

        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Add, 0, 1));
        assert_eq!(outcome.published, Some(1.0 - i64::MAX as f64));

        let outcome = delta.on_market_depth(&event(Side::Ask, DepthOperation::Update, 0, i64::MAX));
        let total = outcome.published.unwrap();
        assert!(total.is_finite());
        assert!(total.abs() < 1e6);

        let outcome = delta.on_market_depth(&event(Side::Bid, DepthOperation::Update, 0, 1));
        assert!(outcome.published.unwrap() > 9.0e18);
    }

    #[test]
    fn test_concurrent_depth_and_bar_updates() {
        let delta = Arc::new(ChangeDelta::new());

        let writers: Vec<_> = [Side::Bid, Side::Ask]
            .into_iter()
            .map(|side| {
                let delta = Arc::clone(&delta);
                thread::spawn(move || {
                    delta.on_market_depth(&event(side, DepthOperation::Add, 0, 10));
                    for volume in 11..=200 {
                        delta.on_market_depth(&event(side, DepthOperation::Update, 0, volume));
                    }
                })
            })
            .collect();

        let reader = {
            let delta = Arc::clone(&delta);
            thread::spawn(move || {
                for i in 0..200 {
                    delta.on_bar_update(i % 10 == 0);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        // Changes telescope: the total only depends on the final best volumes
        assert_eq!(delta.book().best_volumes(), (200, 200));
        assert_eq!(delta.value(), 0.0);
    }
}
