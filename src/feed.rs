//! Recorded host feed
//!
//! One JSON object per line, either a depth event or a bar-update tick:
//!
//! ```text
//! {"type":"depth","symbol":"ES","time":"2026-01-05T14:30:00Z","side":"bid","operation":"add","position":0,"price":5000.25,"volume":100}
//! {"type":"bar","symbol":"ES","time":"2026-01-05T14:30:00Z","first_tick":true}
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{L2DeltaError, Result};
use crate::orderbook::{DepthEvent, DepthOperation, Side};

/// Depth event line
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepthRecord {
    pub symbol: String,
    pub time: DateTime<Utc>,
    pub side: Side,
    pub operation: DepthOperation,
    pub position: usize,
    pub price: f64,
    pub volume: i64,
}

impl DepthRecord {
    pub fn event(&self) -> DepthEvent {
        DepthEvent::new(
            self.side,
            self.operation,
            self.position,
            self.price,
            self.volume,
        )
    }
}

/// Bar-update tick line
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BarRecord {
    pub symbol: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub first_tick: bool,
}

/// A single parsed feed line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedRecord {
    Depth(DepthRecord),
    Bar(BarRecord),
}

impl FeedRecord {
    /// Parse and validate one line
    pub fn parse(line: &str) -> Result<Self> {
        let record: FeedRecord = serde_json::from_str(line)?;
        record.validate()?;
        Ok(record)
    }

    pub fn symbol(&self) -> &str {
        match self {
            FeedRecord::Depth(depth) => &depth.symbol,
            FeedRecord::Bar(bar) => &bar.symbol,
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        match self {
            FeedRecord::Depth(depth) => depth.time,
            FeedRecord::Bar(bar) => bar.time,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.symbol().trim().is_empty() {
            return Err(L2DeltaError::InvalidRecord("empty symbol".to_string()));
        }

        if let FeedRecord::Depth(depth) = self {
            if depth.volume < 0 {
                return Err(L2DeltaError::InvalidRecord(format!(
                    "negative volume {}",
                    depth.volume
                )));
            }
            if !depth.price.is_finite() {
                return Err(L2DeltaError::InvalidRecord(format!(
                    "non-finite price {}",
                    depth.price
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depth_record() {
        let raw = r#"{
            "type": "depth",
            "symbol": "ES",
            "time": "2026-01-05T14:30:00Z",
            "side": "ask",
            "operation": "update",
            "position": 2,
            "price": 5000.25,
            "volume": 17
        }"#;

        let record = FeedRecord::parse(raw).unwrap();
        if let FeedRecord::Depth(depth) = record {
            assert_eq!(depth.symbol, "ES");
            assert_eq!(
                depth.event(),
                DepthEvent::new(Side::Ask, DepthOperation::Update, 2, 5000.25, 17)
            );
        } else {
            panic!("Expected Depth");
        }
    }

    #[test]
    fn test_parse_bar_record() {
        let raw = r#"{"type":"bar","symbol":"NQ","time":"2026-01-05T14:31:00Z","first_tick":true}"#;

        let record = FeedRecord::parse(raw).unwrap();
        assert_eq!(record.symbol(), "NQ");
        assert!(matches!(record, FeedRecord::Bar(BarRecord { first_tick: true, .. })));
    }

    #[test]
    fn test_bar_first_tick_defaults_to_false() {
        let raw = r#"{"type":"bar","symbol":"NQ","time":"2026-01-05T14:31:00Z"}"#;
        assert!(matches!(
            FeedRecord::parse(raw).unwrap(),
            FeedRecord::Bar(BarRecord { first_tick: false, .. })
        ));
    }

    #[test]
    fn test_rejects_negative_volume() {
        let raw = r#"{"type":"depth","symbol":"ES","time":"2026-01-05T14:30:00Z","side":"bid","operation":"add","position":0,"price":1.0,"volume":-5}"#;
        assert!(matches!(
            FeedRecord::parse(raw),
            Err(L2DeltaError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let raw = r#"{"type":"bar","symbol":" ","time":"2026-01-05T14:31:00Z"}"#;
        assert!(matches!(
            FeedRecord::parse(raw),
            Err(L2DeltaError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_a_parse_error() {
        let raw = r#"{"type":"trade","symbol":"ES","time":"2026-01-05T14:30:00Z"}"#;
        assert!(matches!(
            FeedRecord::parse(raw),
            Err(L2DeltaError::ParseError(_))
        ));
    }
}
