//! Leveled progress notifications for in-flight research calls.
//!
//! A [`ProgressSink`] is a fire-and-forget capability set: the adapter emits
//! ordered events at each execution phase and never waits on, or fails
//! because of, delivery. Transport embedders forward events to their own
//! notification mechanism (e.g. MCP context logging) via [`ChannelSink`];
//! callers that do not care pass [`NoopSink`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Severity of a progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Debug,
    Warning,
    Error,
}

impl std::fmt::Display for ProgressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ProgressLevel::Info => "INFO",
            ProgressLevel::Debug => "DEBUG",
            ProgressLevel::Warning => "WARNING",
            ProgressLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One ordered, leveled notification describing an execution phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub level: ProgressLevel,
    pub message: String,
    /// Emission time, assigned when the event is created.
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(level: ProgressLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Delivery target for progress events.
///
/// Delivery order equals call order for a single request. Implementations
/// must swallow their own delivery failures; nothing in the research path
/// may fail because an observer went away.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Deliver one event. Must not panic or block on a slow observer.
    async fn emit(&self, event: ProgressEvent);

    async fn info(&self, message: &str) {
        self.emit(ProgressEvent::new(ProgressLevel::Info, message)).await;
    }

    async fn debug(&self, message: &str) {
        self.emit(ProgressEvent::new(ProgressLevel::Debug, message)).await;
    }

    async fn warning(&self, message: &str) {
        self.emit(ProgressEvent::new(ProgressLevel::Warning, message))
            .await;
    }

    async fn error(&self, message: &str) {
        self.emit(ProgressEvent::new(ProgressLevel::Error, message)).await;
    }
}

/// Sink used when the caller supplied no observer: every level is a no-op.
pub struct NoopSink;

#[async_trait]
impl ProgressSink for NoopSink {
    async fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events to the process-wide `tracing` subscriber at the matching
/// level.
pub struct TracingSink;

#[async_trait]
impl ProgressSink for TracingSink {
    async fn emit(&self, event: ProgressEvent) {
        match event.level {
            ProgressLevel::Info => info!(progress = %event.message),
            ProgressLevel::Debug => debug!(progress = %event.message),
            ProgressLevel::Warning => warn!(progress = %event.message),
            ProgressLevel::Error => error!(progress = %event.message),
        }
    }
}

/// Forwards events into an unbounded channel, preserving emission order.
///
/// If the receiving half has been dropped the event is discarded with a local
/// warning; the research call is never aborted by a departed observer.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }

    /// Convenience constructor returning the sink and its receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn emit(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            warn!("progress observer dropped, discarding event");
        }
    }
}

/// Records all events for test assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: tokio::sync::Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().await.clone()
    }

    pub async fn messages_at(&self, level: ProgressLevel) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn emit(&self, event: ProgressEvent) {
        self.events.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_preserves_order() {
        let (sink, mut receiver) = ChannelSink::channel();
        sink.info("one").await;
        sink.debug("two").await;
        sink.error("three").await;

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.level, ProgressLevel::Info);
        assert_eq!(first.message, "one");
        assert_eq!(receiver.recv().await.unwrap().message, "two");
        let third = receiver.recv().await.unwrap();
        assert_eq!(third.level, ProgressLevel::Error);
        assert_eq!(third.message, "three");
    }

    #[tokio::test]
    async fn test_channel_sink_swallows_closed_receiver() {
        let (sink, receiver) = ChannelSink::channel();
        drop(receiver);
        // Must not panic or error.
        sink.warning("observer is gone").await;
    }

    #[tokio::test]
    async fn test_noop_sink_accepts_all_levels() {
        let sink = NoopSink;
        sink.info("a").await;
        sink.debug("b").await;
        sink.warning("c").await;
        sink.error("d").await;
    }

    #[tokio::test]
    async fn test_recording_sink_filters_by_level() {
        let sink = RecordingSink::new();
        sink.info("keep").await;
        sink.error("boom").await;
        sink.info("also keep").await;

        let infos = sink.messages_at(ProgressLevel::Info).await;
        assert_eq!(infos, vec!["keep".to_string(), "also keep".to_string()]);
        assert_eq!(sink.messages_at(ProgressLevel::Error).await.len(), 1);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&ProgressLevel::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
