//! Two-sided depth book
//!
//! Each side sits behind its own lock so a bid-side mutation never blocks an
//! ask-side reader.

use parking_lot::Mutex;

use super::{ApplyOutcome, DepthEvent, OrderBookSide, PriceLevel, Side};

/// Bid and ask sides for a single instrument
#[derive(Debug, Default)]
pub struct DepthBook {
    bids: Mutex<OrderBookSide>,
    asks: Mutex<OrderBookSide>,
}

impl DepthBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self {
            bids: Mutex::new(OrderBookSide::new()),
            asks: Mutex::new(OrderBookSide::new()),
        }
    }

    fn side(&self, side: Side) -> &Mutex<OrderBookSide> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Apply a depth event to its side, holding only that side's lock
    pub fn apply(&self, event: &DepthEvent) -> ApplyOutcome {
        self.side(event.side)
            .lock()
            .apply(event.operation, event.position, event.level())
    }

    /// Best volume for one side
    pub fn best_volume(&self, side: Side) -> i64 {
        self.side(side).lock().best_volume()
    }

    /// Best bid and best ask volume, each read under its own lock
    pub fn best_volumes(&self) -> (i64, i64) {
        let bid = self.best_volume(Side::Bid);
        let ask = self.best_volume(Side::Ask);
        (bid, ask)
    }

    pub fn best_level(&self, side: Side) -> Option<PriceLevel> {
        self.side(side).lock().best_level()
    }

    pub fn depth(&self, side: Side) -> usize {
        self.side(side).lock().len()
    }

    /// Copy of one side's rows, best first
    pub fn levels(&self, side: Side) -> Vec<PriceLevel> {
        self.side(side).lock().levels().to_vec()
    }

    pub fn clear(&self) {
        self.bids.lock().clear();
        self.asks.lock().clear();
    }
}
