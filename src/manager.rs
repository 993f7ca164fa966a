//! Indicator manager
//!
//! Owns one indicator adapter per instrument and routes feed records to it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::delta::{DepthOutcome, IndicatorKind};
use crate::feed::FeedRecord;
use crate::host::{ChartHost, IndicatorAdapter, LifecycleState};

/// What a dispatched record produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    Depth(DepthOutcome),
    Bar { value: f64 },
    /// No indicator registered for the record's symbol
    Unrouted,
}

/// Routes feed records to per-symbol indicators
pub struct IndicatorManager {
    adapters: HashMap<String, IndicatorAdapter>,
    kind: IndicatorKind,
}

impl IndicatorManager {
    /// Create a manager building indicators of `kind`
    pub fn new(kind: IndicatorKind) -> Self {
        Self {
            adapters: HashMap::new(),
            kind,
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        self.kind
    }

    /// Register a fresh indicator for `symbol` bound to `host`, replacing any
    /// existing one.
    pub fn register(&mut self, symbol: &str, host: Arc<dyn ChartHost>) {
        let adapter = IndicatorAdapter::with_kind(self.kind, host);
        adapter.on_state_change(LifecycleState::SetDefaults);
        adapter.on_state_change(LifecycleState::DataLoaded);

        if let Some(previous) = self.adapters.insert(symbol.to_string(), adapter) {
            previous.on_state_change(LifecycleState::Terminated);
        }
        info!(symbol = %symbol, kind = %self.kind, "Indicator registered");
    }

    /// Route a record to its symbol's indicator
    pub fn dispatch(&self, record: &FeedRecord) -> Dispatch {
        let Some(adapter) = self.adapters.get(record.symbol()) else {
            debug!(symbol = %record.symbol(), "No indicator for symbol");
            return Dispatch::Unrouted;
        };

        match record {
            FeedRecord::Depth(depth) => Dispatch::Depth(adapter.on_market_depth(&depth.event())),
            FeedRecord::Bar(bar) => Dispatch::Bar {
                value: adapter.on_bar_update(bar.first_tick),
            },
        }
    }

    /// Current cumulative value for a symbol
    pub fn value(&self, symbol: &str) -> Option<f64> {
        self.adapters
            .get(symbol)
            .map(|adapter| adapter.indicator().value())
    }

    /// Get list of symbols being tracked
    pub fn symbols(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Check if a symbol exists
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.adapters.contains_key(symbol)
    }

    /// Terminate every indicator
    pub fn shutdown(&mut self) {
        for (_, adapter) in self.adapters.drain() {
            adapter.on_state_change(LifecycleState::Terminated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PlotSeries;

    fn parse(line: &str) -> FeedRecord {
        FeedRecord::parse(line).unwrap()
    }

    fn depth(symbol: &str, side: &str, op: &str, volume: i64) -> FeedRecord {
        parse(&format!(
            r#"{{"type":"depth","symbol":"{symbol}","time":"2026-01-05T14:30:00Z","side":"{side}","operation":"{op}","position":0,"price":100.0,"volume":{volume}}}"#
        ))
    }

    #[test]
    fn test_symbols_are_isolated() {
        let mut manager = IndicatorManager::new(IndicatorKind::Snapshot);
        manager.register("ES", Arc::new(PlotSeries::new()));
        manager.register("NQ", Arc::new(PlotSeries::new()));

        manager.dispatch(&depth("ES", "bid", "update", 100));
        manager.dispatch(&depth("ES", "ask", "update", 40));
        manager.dispatch(&depth("NQ", "bid", "update", 10));

        assert_eq!(manager.value("ES"), Some(60.0));
        assert_eq!(manager.value("NQ"), Some(0.0));
        assert!(manager.has_symbol("NQ"));
    }

    #[test]
    fn test_unknown_symbol_is_unrouted() {
        let manager = IndicatorManager::new(IndicatorKind::Change);
        assert_eq!(
            manager.dispatch(&depth("CL", "bid", "add", 5)),
            Dispatch::Unrouted
        );
        assert_eq!(manager.value("CL"), None);
    }

    #[test]
    fn test_bar_record_returns_plotted_value() {
        let mut manager = IndicatorManager::new(IndicatorKind::Change);
        let series = Arc::new(PlotSeries::new());
        manager.register("ES", series.clone());

        manager.dispatch(&depth("ES", "bid", "add", 50));
        manager.dispatch(&depth("ES", "ask", "add", 30));
        let bar = parse(r#"{"type":"bar","symbol":"ES","time":"2026-01-05T14:31:00Z","first_tick":true}"#);

        assert_eq!(manager.dispatch(&bar), Dispatch::Bar { value: -20.0 });
        assert_eq!(series.current(), Some(-20.0));
    }

    #[test]
    fn test_reregistering_starts_fresh() {
        let mut manager = IndicatorManager::new(IndicatorKind::Snapshot);
        manager.register("ES", Arc::new(PlotSeries::new()));
        manager.dispatch(&depth("ES", "bid", "update", 100));
        manager.dispatch(&depth("ES", "ask", "update", 40));

        manager.register("ES", Arc::new(PlotSeries::new()));
        assert_eq!(manager.value("ES"), Some(0.0));

        manager.shutdown();
        assert!(manager.symbols().is_empty());
    }
}
