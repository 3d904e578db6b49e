//! Display bindings for a session.
//!
//! The session calls every subscribed [`DisplaySink`] after each store
//! mutation, on each failed attempt, and on each `Busy` rejection.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::session::View;

pub trait DisplaySink: Send + Sync {
    /// Latest recent samples and statistics, after every store mutation.
    fn on_view_updated(&self, view: &Arc<View>);

    /// A `run_test` or `clear_cache` attempt failed.
    fn on_error(&self, message: &str);

    /// An operation was rejected because another one is in flight.
    fn on_busy(&self);
}

// ─── Broadcast sink (dashboard / SSE) ────────────────────────────

/// One notification as pushed to dashboard clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SinkEvent {
    View(Arc<View>),
    Error(String),
    Busy,
}

/// Fans notifications out to any number of stream subscribers.
/// Slow subscribers lag and drop old events; sends never block.
#[derive(Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<SinkEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SinkEvent> {
        self.tx.subscribe()
    }

    fn send(&self, event: SinkEvent) {
        // Err only means nobody is listening right now
        let _ = self.tx.send(event);
    }
}

impl DisplaySink for BroadcastSink {
    fn on_view_updated(&self, view: &Arc<View>) {
        self.send(SinkEvent::View(Arc::clone(view)));
    }

    fn on_error(&self, message: &str) {
        self.send(SinkEvent::Error(message.to_owned()));
    }

    fn on_busy(&self) {
        self.send(SinkEvent::Busy);
    }
}

// ─── Log sink (console) ──────────────────────────────────────────

/// Writes a one-line summary of every notification through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn on_view_updated(&self, view: &Arc<View>) {
        let stats = &view.statistics;
        let last = view.recent.first();
        tracing::info!(
            total = stats.total_requests,
            cached_avg_ms = stats.cached.latency.avg_latency_ms,
            uncached_avg_ms = stats.uncached.avg_latency_ms,
            hit_rate_pct = stats.cached.hit_rate,
            last_variant = last.map(|s| s.variant.as_str()).unwrap_or("-"),
            last_ms = last.map(|s| s.latency_ms).unwrap_or(0.0),
            "view updated"
        );
    }

    fn on_error(&self, message: &str) {
        tracing::warn!(%message, "test failed");
    }

    fn on_busy(&self) {
        tracing::info!("rejected: operation already in flight");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Statistics;

    #[test]
    fn broadcast_sink_delivers_to_subscribers() {
        let sink = BroadcastSink::new(8);
        let mut rx = sink.subscribe();

        let view = Arc::new(View {
            recent: Vec::new(),
            statistics: Statistics::empty(),
        });
        sink.on_view_updated(&view);
        sink.on_error("boom");
        sink.on_busy();

        assert!(matches!(rx.try_recv(), Ok(SinkEvent::View(v)) if v.recent.is_empty()));
        assert!(matches!(rx.try_recv(), Ok(SinkEvent::Error(m)) if m == "boom"));
        assert!(matches!(rx.try_recv(), Ok(SinkEvent::Busy)));
    }

    #[test]
    fn broadcast_without_subscribers_is_silent() {
        let sink = BroadcastSink::new(1);
        sink.on_busy();
        sink.on_error("nobody listening");
    }

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_value(SinkEvent::Error("500".into())).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"], "500");
        let json = serde_json::to_value(SinkEvent::Busy).unwrap();
        assert_eq!(json["type"], "busy");
    }
}
