//! Top-of-book delta that resets on every bar

use parking_lot::Mutex;
use tracing::trace;

use super::{DeltaIndicator, DepthOutcome, IndicatorKind};
use crate::orderbook::{DepthEvent, Side};

#[derive(Debug, Default)]
struct SnapshotState {
    cumulative_delta: f64,
    best_bid_volume: i64,
    best_ask_volume: i64,
}

/// Sums `best_bid_volume - best_ask_volume` each time either best volume
/// changes, once both sides have reported a positive volume.
///
/// Only rank-0 reports are used; deeper rows are filtered out.
#[derive(Debug, Default)]
pub struct SnapshotDelta {
    state: Mutex<SnapshotState>,
}

impl SnapshotDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported best bid and best ask volume
    pub fn best_volumes(&self) -> (i64, i64) {
        let state = self.state.lock();
        (state.best_bid_volume, state.best_ask_volume)
    }
}

impl DeltaIndicator for SnapshotDelta {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Snapshot
    }

    fn on_market_depth(&self, event: &DepthEvent) -> DepthOutcome {
        if event.position != 0 {
            return DepthOutcome::rejected();
        }

        let mut state = self.state.lock();

        let best = match event.side {
            Side::Bid => &mut state.best_bid_volume,
            Side::Ask => &mut state.best_ask_volume,
        };
        let changed = *best != event.volume;
        *best = event.volume;

        if !changed || state.best_bid_volume <= 0 || state.best_ask_volume <= 0 {
            return DepthOutcome::accepted(None);
        }

        let raw_delta = state.best_bid_volume - state.best_ask_volume;
        state.cumulative_delta += raw_delta as f64;

        trace!(
            side = event.side.as_str(),
            raw_delta,
            cumulative_delta = state.cumulative_delta,
            "Top of book changed"
        );

        DepthOutcome::accepted(Some(state.cumulative_delta))
    }

    fn on_bar_update(&self, is_first_tick_of_bar: bool) -> f64 {
        let mut state = self.state.lock();
        if is_first_tick_of_bar {
            state.cumulative_delta = 0.0;
        }
        state.cumulative_delta
    }

    fn reset(&self) {
        *self.state.lock() = SnapshotState::default();
    }

    fn value(&self) -> f64 {
        self.state.lock().cumulative_delta
    }
}
