//! Cached vs uncached fetch latency, measured one interactive test at a time.
//!
//! A [`session::SessionController`] asks a [`source::SampleSource`] for timed
//! outcomes, keeps them in a [`metrics::SampleStore`], and publishes
//! [`metrics::Statistics`] snapshots to every subscribed [`sink::DisplaySink`].

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod session;
pub mod sink;
pub mod source;

pub use config::Config;
pub use error::{ConfigError, InvalidSample, SessionError};
pub use metrics::{Sample, SampleStore, Statistics, Variant};
pub use session::{SessionController, SessionState, View};
pub use sink::{BroadcastSink, DisplaySink, LogSink};
pub use source::{FetchError, SampleSource};

/// Shared application state available to every handler via `State<Arc<AppState<S>>>`.
pub struct AppState<S> {
    /// The one session this process serves.
    pub session: Arc<SessionController<S>>,

    /// Dashboard feed, the SSE endpoint subscribes here.
    pub events: BroadcastSink,
}

impl<S: SampleSource + 'static> AppState<S> {
    /// Wrap `session` and subscribe a fresh broadcast sink to it.
    pub fn new(session: Arc<SessionController<S>>, event_capacity: usize) -> Self {
        let events = BroadcastSink::new(event_capacity);
        session.subscribe(Arc::new(events.clone()));
        Self { session, events }
    }
}
