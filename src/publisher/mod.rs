//! Publisher module for IPC communication
//!
//! Forwards plotted values and redraw signals to the chart renderer.

use std::path::Path;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::error::{L2DeltaError, Result};

/// Message sent to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartMessage {
    /// Plot value for a bar
    Value {
        symbol: String,
        plot: String,
        bar: usize,
        value: f64,
        time: DateTime<Utc>,
    },
    /// Repaint request
    Redraw { symbol: String },
}

impl ChartMessage {
    pub fn symbol(&self) -> &str {
        match self {
            ChartMessage::Value { symbol, .. } => symbol,
            ChartMessage::Redraw { symbol } => symbol,
        }
    }
}

/// Encode a message as a 4-byte big-endian length followed by MessagePack
pub fn encode_frame(message: &ChartMessage) -> Result<BytesMut> {
    let data = rmp_serde::to_vec_named(message)?;
    let mut frame = BytesMut::with_capacity(4 + data.len());
    frame.put_u32(data.len() as u32);
    frame.put_slice(&data);
    Ok(frame)
}

/// Publisher for sending chart messages via Unix socket
pub struct Publisher {
    socket_path: String,
    stream: Mutex<Option<UnixStream>>,
}

impl Publisher {
    /// Create a new publisher
    pub async fn new(socket_path: &str) -> Result<Self> {
        let publisher = Self {
            socket_path: socket_path.to_string(),
            stream: Mutex::new(None),
        };

        // Renderer may not be listening yet
        if let Err(e) = publisher.connect().await {
            warn!(error = %e, "Initial IPC connection failed, will retry on publish");
        }

        Ok(publisher)
    }

    /// Connect to the Unix socket
    async fn connect(&self) -> Result<()> {
        let path = Path::new(&self.socket_path);

        if !path.exists() {
            return Err(L2DeltaError::IpcError(format!(
                "Socket path does not exist: {}",
                self.socket_path
            )));
        }

        let stream = UnixStream::connect(path).await.map_err(|e| {
            L2DeltaError::IpcError(format!("Failed to connect to {}: {}", self.socket_path, e))
        })?;

        let mut guard = self.stream.lock().await;
        *guard = Some(stream);

        info!(path = %self.socket_path, "Connected to IPC socket");
        Ok(())
    }

    /// Publish one chart message; IPC failures are logged, never returned
    pub async fn publish(&self, message: &ChartMessage) -> Result<()> {
        let frame = encode_frame(message)?;

        let mut guard = self.stream.lock().await;

        if guard.is_none() {
            drop(guard);
            if let Err(e) = self.connect().await {
                debug!(error = %e, "Dropping chart message, IPC socket unavailable");
                return Ok(());
            }
            guard = self.stream.lock().await;
        }

        if let Some(stream) = guard.as_mut() {
            match stream.write_all(&frame).await {
                Ok(_) => {
                    debug!(symbol = %message.symbol(), "Published chart message");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to write to IPC socket");
                    *guard = None;
                }
            }
        }

        Ok(())
    }

    /// Drain a channel of chart messages until every sender is dropped
    pub async fn run(&self, mut rx: mpsc::UnboundedReceiver<ChartMessage>) -> Result<u64> {
        let mut forwarded = 0;
        while let Some(message) = rx.recv().await {
            self.publish(&message).await?;
            forwarded += 1;
        }
        info!(forwarded, "Chart message channel closed");
        Ok(forwarded)
    }
}
