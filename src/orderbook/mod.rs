//! Order book module
//!
//! Maintains rank-ordered depth rows per side from level-2 depth events.

mod book;
mod side;

pub use book::DepthBook;
pub use side::{ApplyOutcome, OrderBookSide};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

/// Mutation carried by a depth event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthOperation {
    Add,
    Remove,
    Update,
}

impl DepthOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthOperation::Add => "add",
            DepthOperation::Remove => "remove",
            DepthOperation::Update => "update",
        }
    }
}

/// A single row in one side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: OrderedFloat<f64>,
    pub volume: i64,
}

impl PriceLevel {
    pub fn new(price: f64, volume: i64) -> Self {
        Self {
            price: OrderedFloat(price),
            volume,
        }
    }
}

/// One order-book mutation as delivered by the market data feed.
///
/// `position` is the rank on the event's side, 0 being the best level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthEvent {
    pub side: Side,
    pub operation: DepthOperation,
    pub position: usize,
    pub price: f64,
    pub volume: i64,
}

impl DepthEvent {
    pub fn new(
        side: Side,
        operation: DepthOperation,
        position: usize,
        price: f64,
        volume: i64,
    ) -> Self {
        Self {
            side,
            operation,
            position,
            price,
            volume,
        }
    }

    pub fn level(&self) -> PriceLevel {
        PriceLevel::new(self.price, self.volume)
    }
}
