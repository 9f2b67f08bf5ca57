//! Push channel for live controller events.
//!
//! The controller pushes telemetry and configuration changes over a
//! WebSocket as JSON text frames, one externally tagged event per frame:
//!
//! ```json
//! {"event": "data_update", "data": {"temperature": 23.8, "fanSpeed": 40, "timestamp": 1724312461000}}
//! {"event": "config_update", "data": {"threshold": 31.5}}
//! ```
//!
//! A [`PushChannel`] owns its subscription: constructing one spawns the
//! reader task, dropping it aborts the task and closes the connection.
//! There is no shared connection state anywhere else in the crate.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

use super::api::{TelemetryRecord, ThresholdConfig};

/// Delay between reconnection attempts after a lost connection.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(800);

/// Depth of the event queue between the reader task and the engine.
const EVENT_QUEUE_DEPTH: usize = 16;

/// One event pushed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    /// A fresh telemetry sample.
    DataUpdate(TelemetryRecord),
    /// The threshold changed on the controller side.
    ConfigUpdate(ThresholdConfig),
}

/// An owned subscription to the controller's push events.
///
/// The channel holds exactly one subscription covering both event kinds;
/// events are delivered in controller order. Connection loss is retried
/// with a fixed delay and never surfaces past a warning log, so consumers
/// only ever see a gap in events.
#[derive(Debug)]
pub struct PushChannel {
    events: mpsc::Receiver<PushEvent>,
    reader: Option<JoinHandle<()>>,
    description: String,
}

impl PushChannel {
    /// Subscribe to a controller's WebSocket endpoint.
    ///
    /// The reader task connects immediately and keeps reconnecting until
    /// the channel is dropped.
    pub fn connect(ws_url: &str) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let url = ws_url.to_string();
        let description = format!("push: {}", url);
        let reader = tokio::spawn(read_events(url, tx));

        Self {
            events: rx,
            reader: Some(reader),
            description,
        }
    }

    /// Create a channel pair for feeding events without a connection.
    ///
    /// Returns (sender, channel) where the sender pushes events straight
    /// into the channel. Useful for tests and alternative transports.
    pub fn pair(description: &str) -> (mpsc::Sender<PushEvent>, Self) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let channel = Self {
            events: rx,
            reader: None,
            description: format!("push: {}", description),
        };
        (tx, channel)
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the feed has ended (every sender dropped). A
    /// lost connection does not end the feed; the reader keeps its sender
    /// across reconnects.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.events.recv().await
    }

    /// Where this channel's events come from.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Supervised read loop: connect, drain frames, reconnect on loss.
async fn read_events(url: String, tx: mpsc::Sender<PushEvent>) {
    loop {
        match connect_async(&url).await {
            Ok((stream, _)) => {
                info!("Push channel connected to {}", url);
                let (_, mut frames) = stream.split();

                while let Some(item) = frames.next().await {
                    match item {
                        Ok(Message::Text(frame)) => {
                            match serde_json::from_str::<PushEvent>(&frame) {
                                Ok(event) => {
                                    if tx.send(event).await.is_err() {
                                        // Channel dropped
                                        return;
                                    }
                                }
                                Err(e) => warn!("Skipping malformed push frame: {}", e),
                            }
                        }
                        Ok(_) => {
                            // Pings and binary frames are not part of the contract
                        }
                        Err(e) => {
                            warn!("Push channel read error: {}", e);
                            break;
                        }
                    }
                }

                warn!("Push channel to {} closed, reconnecting", url);
            }
            Err(e) => warn!("Push channel connect to {} failed: {}", url, e),
        }

        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
