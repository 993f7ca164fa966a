//! Cumulative L2 Delta
//!
//! Order-book depth bookkeeping and the two cumulative delta indicators built
//! on it, plus a replay service that drives them from a recorded host feed
//! and publishes the plotted values.

use std::sync::Arc;

pub mod config;
pub mod delta;
pub mod error;
pub mod feed;
pub mod host;
pub mod manager;
pub mod metrics;
pub mod orderbook;
pub mod publisher;
pub mod replay;

pub use config::Config;
pub use delta::{ChangeDelta, DeltaIndicator, DepthOutcome, IndicatorKind, SnapshotDelta};
pub use error::{L2DeltaError, Result};
pub use feed::FeedRecord;
pub use host::{ChartHost, IndicatorAdapter, LifecycleState, PlotSeries};
pub use manager::IndicatorManager;
pub use metrics::Metrics;
pub use orderbook::{DepthBook, DepthEvent, DepthOperation, OrderBookSide, PriceLevel, Side};
pub use publisher::{ChartMessage, Publisher};
pub use replay::{FeedReplayer, ReplaySummary};

/// Application state shared across components
pub struct AppState {
    pub config: Arc<Config>,
    pub metrics: Metrics,
    pub registry: prometheus::Registry,
}
