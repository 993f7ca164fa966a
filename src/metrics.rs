//! Prometheus counters for the replay service

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::orderbook::{DepthOperation, Side};

/// Counters registered into a caller-provided registry
#[derive(Clone)]
pub struct Metrics {
    depth_events: IntCounterVec,
    depth_events_ignored: IntCounter,
    bar_updates: IntCounter,
    values_published: IntCounter,
    feed_rejected: IntCounter,
}

impl Metrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let depth_events = IntCounterVec::new(
            Opts::new("l2delta_depth_events_total", "Depth events received"),
            &["side", "operation"],
        )?;
        let depth_events_ignored = IntCounter::new(
            "l2delta_depth_events_ignored_total",
            "Depth events filtered or dropped as out of range",
        )?;
        let bar_updates = IntCounter::new("l2delta_bar_updates_total", "Bar-update ticks")?;
        let values_published = IntCounter::new(
            "l2delta_values_published_total",
            "Cumulative delta values published from depth events",
        )?;
        let feed_rejected = IntCounter::new(
            "l2delta_feed_rejected_total",
            "Feed lines that failed to parse or validate",
        )?;

        registry.register(Box::new(depth_events.clone()))?;
        registry.register(Box::new(depth_events_ignored.clone()))?;
        registry.register(Box::new(bar_updates.clone()))?;
        registry.register(Box::new(values_published.clone()))?;
        registry.register(Box::new(feed_rejected.clone()))?;

        Ok(Self {
            depth_events,
            depth_events_ignored,
            bar_updates,
            values_published,
            feed_rejected,
        })
    }

    pub fn record_depth_event(&self, side: Side, operation: DepthOperation) {
        self.depth_events
            .with_label_values(&[side.as_str(), operation.as_str()])
            .inc();
    }

    pub fn inc_depth_ignored(&self) {
        self.depth_events_ignored.inc();
    }

    pub fn inc_bar_updates(&self) {
        self.bar_updates.inc();
    }

    pub fn inc_values_published(&self) {
        self.values_published.inc();
    }

    pub fn inc_feed_rejected(&self) {
        self.feed_rejected.inc();
    }

    pub fn depth_events(&self, side: Side, operation: DepthOperation) -> u64 {
        self.depth_events
            .with_label_values(&[side.as_str(), operation.as_str()])
            .get()
    }

    pub fn depth_ignored(&self) -> u64 {
        self.depth_events_ignored.get()
    }

    pub fn bar_updates(&self) -> u64 {
        self.bar_updates.get()
    }

    pub fn values_published(&self) -> u64 {
        self.values_published.get()
    }

    pub fn feed_rejected(&self) -> u64 {
        self.feed_rejected.get()
    }
}
