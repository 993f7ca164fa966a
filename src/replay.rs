//! Feed replay
//!
//! Reads a recorded host feed and drives the indicators the way a live host
//! would: depth events and bar ticks in file order, one adapter per symbol.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::delta::IndicatorKind;
use crate::error::Result;
use crate::feed::FeedRecord;
use crate::host::{ChartHost, PlotSeries};
use crate::manager::{Dispatch, IndicatorManager};
use crate::metrics::Metrics;
use crate::publisher::ChartMessage;

/// Chart host that records the plot locally and forwards every value and
/// redraw request onto the publisher channel.
pub struct ForwardingHost {
    symbol: String,
    plot: &'static str,
    series: PlotSeries,
    clock: Mutex<DateTime<Utc>>,
    tx: mpsc::UnboundedSender<ChartMessage>,
}

impl ForwardingHost {
    pub fn new(
        symbol: &str,
        kind: IndicatorKind,
        tx: mpsc::UnboundedSender<ChartMessage>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            plot: kind.plot_name(),
            series: PlotSeries::new(),
            clock: Mutex::new(DateTime::<Utc>::default()),
            tx,
        }
    }

    /// Move the host clock to the time of the record being dispatched
    pub fn advance(&self, time: DateTime<Utc>) {
        *self.clock.lock() = time;
    }

    pub fn start_bar(&self) {
        self.series.start_bar();
    }

    fn send(&self, message: ChartMessage) {
        if self.tx.send(message).is_err() {
            debug!(symbol = %self.symbol, "Publisher channel closed");
        }
    }
}

impl ChartHost for ForwardingHost {
    fn set_value(&self, value: f64) {
        self.series.set_value(value);
        let bar = self.series.current_bar().unwrap_or(0);
        let time = *self.clock.lock();
        self.send(ChartMessage::Value {
            symbol: self.symbol.clone(),
            plot: self.plot.to_string(),
            bar,
            value,
            time,
        });
    }

    fn request_redraw(&self) {
        self.series.request_redraw();
        self.send(ChartMessage::Redraw {
            symbol: self.symbol.clone(),
        });
    }
}

/// Counts from one replay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub lines_read: u64,
    pub records_dispatched: u64,
    pub records_rejected: u64,
}

/// Replays a feed file through an [`IndicatorManager`]
pub struct FeedReplayer {
    path: PathBuf,
    pace: Duration,
    manager: IndicatorManager,
    hosts: HashMap<String, Arc<ForwardingHost>>,
    metrics: Metrics,
    tx: mpsc::UnboundedSender<ChartMessage>,
}

impl FeedReplayer {
    pub fn new(
        path: impl AsRef<Path>,
        kind: IndicatorKind,
        metrics: Metrics,
        tx: mpsc::UnboundedSender<ChartMessage>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pace: Duration::ZERO,
            manager: IndicatorManager::new(kind),
            hosts: HashMap::new(),
            metrics,
            tx,
        }
    }

    /// Delay between records
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Replay the whole file. Bad lines are skipped; only I/O errors abort.
    ///
    /// Consumes the replayer so the publisher channel closes when it returns.
    pub async fn run(mut self) -> Result<ReplaySummary> {
        info!(path = %self.path.display(), kind = %self.manager.kind(), "Starting feed replay");

        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut summary = ReplaySummary::default();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            summary.lines_read += 1;

            let record = match FeedRecord::parse(&line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = summary.lines_read, error = %e, "Rejected feed line");
                    self.metrics.inc_feed_rejected();
                    summary.records_rejected += 1;
                    continue;
                }
            };

            self.process_record(&record);
            summary.records_dispatched += 1;

            if !self.pace.is_zero() {
                sleep(self.pace).await;
            }
        }

        for symbol in self.manager.symbols() {
            info!(
                symbol = %symbol,
                value = ?self.manager.value(&symbol),
                "Final cumulative delta"
            );
        }
        self.manager.shutdown();

        info!(
            lines = summary.lines_read,
            dispatched = summary.records_dispatched,
            rejected = summary.records_rejected,
            "Feed replay finished"
        );
        Ok(summary)
    }

    fn host_for(&mut self, symbol: &str) -> Arc<ForwardingHost> {
        if let Some(host) = self.hosts.get(symbol) {
            return Arc::clone(host);
        }

        let host = Arc::new(ForwardingHost::new(
            symbol,
            self.manager.kind(),
            self.tx.clone(),
        ));
        self.manager.register(symbol, host.clone());
        self.hosts.insert(symbol.to_string(), host.clone());
        host
    }

    fn process_record(&mut self, record: &FeedRecord) {
        let host = self.host_for(record.symbol());
        host.advance(record.time());

        if let FeedRecord::Bar(bar) = record {
            if bar.first_tick {
                host.start_bar();
            }
        }

        match self.manager.dispatch(record) {
            Dispatch::Depth(outcome) => {
                if let FeedRecord::Depth(depth) = record {
                    self.metrics.record_depth_event(depth.side, depth.operation);
                }
                if !outcome.accepted {
                    self.metrics.inc_depth_ignored();
                }
                if outcome.published.is_some() {
                    self.metrics.inc_values_published();
                }
            }
            Dispatch::Bar { .. } => self.metrics.inc_bar_updates(),
            Dispatch::Unrouted => {}
        }
    }
}
