//! Cumulative delta indicators
//!
//! Two accumulators fed by depth events and bar boundaries:
//! - [`SnapshotDelta`] sums best-bid minus best-ask volume on every top-of-book
//!   change and starts again from zero on each bar.
//! - [`ChangeDelta`] keeps the full book, sums the change in best-ask volume
//!   minus the change in best-bid volume and carries the total across bars.

mod change;
mod snapshot;

pub use change::ChangeDelta;
pub use snapshot::SnapshotDelta;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::L2DeltaError;
use crate::orderbook::DepthEvent;

/// Result of handing one depth event to an indicator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepthOutcome {
    /// The event was used (not filtered out or dropped as out of range)
    pub accepted: bool,
    /// New cumulative value to plot immediately, if the event produced one
    pub published: Option<f64>,
}

impl DepthOutcome {
    pub(crate) fn rejected() -> Self {
        Self::default()
    }

    pub(crate) fn accepted(published: Option<f64>) -> Self {
        Self {
            accepted: true,
            published,
        }
    }
}

/// Which accumulator an indicator instance runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Snapshot,
    Change,
}

impl IndicatorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            IndicatorKind::Snapshot => "Cumulative L2 Delta",
            IndicatorKind::Change => "Cumulative L2 Delta (Change)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IndicatorKind::Snapshot => {
                "Calculates a cumulative delta of the best bid/ask volume, resetting each bar."
            }
            IndicatorKind::Change => {
                "Calculates a cumulative delta of changes in best bid/ask volume across bars."
            }
        }
    }

    /// Name of the single line plot
    pub fn plot_name(&self) -> &'static str {
        match self {
            IndicatorKind::Snapshot => "CumL2Delta",
            IndicatorKind::Change => "CumL2DeltaChange",
        }
    }

    /// Build a fresh indicator of this kind
    pub fn build(&self) -> Box<dyn DeltaIndicator> {
        match self {
            IndicatorKind::Snapshot => Box::new(SnapshotDelta::new()),
            IndicatorKind::Change => Box::new(ChangeDelta::new()),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Snapshot => f.write_str("snapshot"),
            IndicatorKind::Change => f.write_str("change"),
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = L2DeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(IndicatorKind::Snapshot),
            "change" => Ok(IndicatorKind::Change),
            other => Err(L2DeltaError::ConfigError(format!(
                "unknown indicator kind: {other}"
            ))),
        }
    }
}

/// Core entry points shared by both accumulators.
///
/// Methods take `&self`: depth events and bar updates arrive on different
/// threads, so each implementation guards its own state.
pub trait DeltaIndicator: Send + Sync {
    fn kind(&self) -> IndicatorKind;

    /// Handle one order-book mutation
    fn on_market_depth(&self, event: &DepthEvent) -> DepthOutcome;

    /// Handle a bar-update tick and return the value to plot for it
    fn on_bar_update(&self, is_first_tick_of_bar: bool) -> f64;

    /// Return to the initial state (new session or data load)
    fn reset(&self);

    /// Current cumulative value
    fn value(&self) -> f64;
}
