//! Host adapter layer
//!
//! Maps charting-host lifecycle and data callbacks onto a [`DeltaIndicator`]
//! and forwards its output to a [`ChartHost`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::delta::{DeltaIndicator, DepthOutcome, IndicatorKind};
use crate::orderbook::DepthEvent;

/// Output side of the charting host
#[cfg_attr(test, mockall::automock)]
pub trait ChartHost: Send + Sync {
    /// Set the plotted value of the bar currently being built
    fn set_value(&self, value: f64);

    /// Ask for a repaint outside the normal bar cadence; fire and forget
    fn request_redraw(&self);
}

/// Host lifecycle states the adapter reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    SetDefaults,
    DataLoaded,
    Terminated,
}

/// In-memory plot keeping one value per bar
#[derive(Debug, Default)]
pub struct PlotSeries {
    values: Mutex<Vec<f64>>,
    redraws: AtomicU64,
}

impl PlotSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new bar slot holding 0 until a value is set
    pub fn start_bar(&self) {
        self.values.lock().push(0.0);
    }

    /// Index of the bar being built, if any
    pub fn current_bar(&self) -> Option<usize> {
        self.values.lock().len().checked_sub(1)
    }

    pub fn current(&self) -> Option<f64> {
        self.values.lock().last().copied()
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.lock().clone()
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws.load(Ordering::Relaxed)
    }
}

impl ChartHost for PlotSeries {
    fn set_value(&self, value: f64) {
        let mut values = self.values.lock();
        match values.last_mut() {
            Some(slot) => *slot = value,
            None => values.push(value),
        }
    }

    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }
}

/// Binds one indicator instance to its host
pub struct IndicatorAdapter {
    indicator: Box<dyn DeltaIndicator>,
    host: Arc<dyn ChartHost>,
}

impl IndicatorAdapter {
    pub fn new(indicator: Box<dyn DeltaIndicator>, host: Arc<dyn ChartHost>) -> Self {
        Self { indicator, host }
    }

    /// Build a fresh indicator of `kind` bound to `host`
    pub fn with_kind(kind: IndicatorKind, host: Arc<dyn ChartHost>) -> Self {
        Self::new(kind.build(), host)
    }

    pub fn kind(&self) -> IndicatorKind {
        self.indicator.kind()
    }

    pub fn indicator(&self) -> &dyn DeltaIndicator {
        self.indicator.as_ref()
    }

    pub fn on_state_change(&self, state: LifecycleState) {
        match state {
            LifecycleState::SetDefaults => {
                debug!(
                    indicator = self.kind().display_name(),
                    description = self.kind().description(),
                    plot = self.kind().plot_name(),
                    "Indicator defaults applied"
                );
            }
            LifecycleState::DataLoaded => {
                self.indicator.reset();
                info!(indicator = self.kind().display_name(), "Indicator state reset");
            }
            LifecycleState::Terminated => {
                debug!(
                    indicator = self.kind().display_name(),
                    value = self.indicator.value(),
                    "Indicator terminated"
                );
            }
        }
    }

    /// Forward a depth event; a published value is plotted and a redraw
    /// requested after the indicator has released its locks.
    ///
    /// A bar can start between the indicator returning and `set_value`, so a
    /// host that needs depth values pinned to their bar must serialize
    /// `start_bar` against depth dispatch itself.
    pub fn on_market_depth(&self, event: &DepthEvent) -> DepthOutcome {
        let outcome = self.indicator.on_market_depth(event);
        if let Some(value) = outcome.published {
            self.host.set_value(value);
            self.host.request_redraw();
        }
        outcome
    }

    /// Forward a bar-update tick and plot the value for it
    pub fn on_bar_update(&self, is_first_tick_of_bar: bool) -> f64 {
        let value = self.indicator.on_bar_update(is_first_tick_of_bar);
        self.host.set_value(value);
        value
    }
}
