//! Configuration module for the L2 delta service

use serde::Deserialize;
use std::env;

use crate::delta::IndicatorKind;
use crate::error::{L2DeltaError, Result};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Recorded host feed to replay (JSON lines)
    pub feed_path: String,

    /// Which accumulator to run for every symbol
    pub indicator: IndicatorKind,

    /// IPC socket path for publishing chart messages
    pub ipc_socket_path: String,

    /// Port of the health and metrics server
    pub health_port: u16,

    /// Delay between replayed records
    pub replay_pace_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let indicator = env::var("INDICATOR")
            .unwrap_or_else(|_| "change".to_string())
            .parse()?;

        Ok(Self {
            feed_path: env::var("FEED_PATH").unwrap_or_else(|_| "feed.jsonl".to_string()),
            indicator,
            ipc_socket_path: env::var("IPC_SOCKET_PATH")
                .unwrap_or_else(|_| "/tmp/l2delta.sock".to_string()),
            health_port: parse_var("HEALTH_PORT", 9090)?,
            replay_pace_ms: parse_var("REPLAY_PACE_MS", 0)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| L2DeltaError::ConfigError(format!("invalid {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_path: "feed.jsonl".to_string(),
            indicator: IndicatorKind::Change,
            ipc_socket_path: "/tmp/l2delta.sock".to_string(),
            health_port: 9090,
            replay_pace_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("L2DELTA_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("L2DELTA_TEST_BAD_PORT", "ninety");
        let result: Result<u16> = parse_var("L2DELTA_TEST_BAD_PORT", 9090);
        assert!(matches!(result, Err(L2DeltaError::ConfigError(_))));
    }

    #[test]
    fn test_default_runs_change_variant() {
        let config = Config::default();
        assert_eq!(config.indicator, IndicatorKind::Change);
        assert_eq!(config.health_port, 9090);
    }
}
