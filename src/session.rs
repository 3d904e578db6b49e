//! One interactive measuring session.
//!
//! The controller owns the sample store and the running statistics, asks a
//! [`SampleSource`] for outcomes, and tells every subscribed
//! [`DisplaySink`] about the result. At most one mutating operation is in
//! flight; anything requested meanwhile is rejected with
//! [`SessionError::Busy`].

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{InvalidSample, SessionError};
use crate::metrics::{compute, Aggregator, Sample, SampleStore, Statistics, Variant};
use crate::sink::DisplaySink;
use crate::source::{FetchError, SampleSource};

/// Number of samples shown in a view when nothing else is configured.
pub const DEFAULT_RECENT_WINDOW: usize = 10;

// ─── Public types ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running(Variant),
    ClearingCache,
    ClearingResults,
    /// A failed attempt that is being surfaced; back to `Idle` right after.
    Error(String),
}

/// What a display gets: the newest samples and a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    /// Most recent first
    pub recent: Vec<Sample>,
    pub statistics: Statistics,
}

impl View {
    fn empty() -> Self {
        Self {
            recent: Vec::new(),
            statistics: Statistics::empty(),
        }
    }
}

pub struct SessionController<S> {
    id: Uuid,
    source: S,
    recent_window: usize,
    state: Mutex<SessionState>,
    data: Mutex<Data>,
    /// Last published view; replaced wholesale, never edited in place
    view: Mutex<Arc<View>>,
    sinks: RwLock<Vec<Arc<dyn DisplaySink>>>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Data {
    store: SampleStore,
    agg: Aggregator,
}

impl Data {
    fn push(&mut self, mut sample: Sample) -> Result<(), InvalidSample> {
        // The source stamps wall-clock time; a clock step backwards must not
        // turn a good fetch into an out-of-order sample.
        if let Some(last) = self.store.recent(1).next() {
            if sample.captured_at < last.captured_at {
                tracing::debug!(
                    got = %sample.captured_at,
                    last = %last.captured_at,
                    "clamping capture time"
                );
                sample.captured_at = last.captured_at;
            }
        }
        let counted = sample.clone();
        self.store.append(sample)?;
        self.agg.push(&counted);
        Ok(())
    }

    fn clear(&mut self) {
        self.store.clear();
        self.agg.reset();
    }

    fn view(&self, recent_window: usize) -> View {
        View {
            recent: self.store.recent(recent_window).cloned().collect(),
            statistics: self.agg.snapshot(),
        }
    }
}

/// Holds the in-flight slot; returns the session to `Idle` when dropped,
/// including when the caller abandons the future mid-fetch.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
}

impl InFlight<'_> {
    fn fail(&self, message: String) {
        *self.state.lock() = SessionState::Error(message);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.state.lock() = SessionState::Idle;
    }
}

// ─── SessionController impl ──────────────────────────────────────

impl<S: SampleSource + 'static> SessionController<S> {
    /// Run a test on its own task. The attempt completes (or fails) even if
    /// the returned handle is dropped; there is no mid-request cancellation.
    pub fn spawn_test(self: &Arc<Self>, variant: Variant) -> JoinHandle<Result<Arc<View>, SessionError>> {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.run_test(variant).await })
    }

    /// `clear_cache` on its own task, for the same reason as `spawn_test`.
    pub fn spawn_clear_cache(self: &Arc<Self>) -> JoinHandle<Result<(), SessionError>> {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.clear_cache().await })
    }
}

impl<S: SampleSource> SessionController<S> {
    pub fn new(source: S, recent_window: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            recent_window,
            state: Mutex::new(SessionState::Idle),
            data: Mutex::new(Data {
                store: SampleStore::new(),
                agg: Aggregator::new(),
            }),
            view: Mutex::new(Arc::new(View::empty())),
            sinks: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Register a display; it receives every later notification.
    pub fn subscribe(&self, sink: Arc<dyn DisplaySink>) {
        self.sinks.write().push(sink);
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// The last published view. Never waits on an in-flight fetch.
    pub fn view(&self) -> Arc<View> {
        self.view.lock().clone()
    }

    pub fn statistics(&self) -> Statistics {
        self.view().statistics.clone()
    }

    /// Statistics recomputed from scratch over the whole store.
    pub fn recompute(&self) -> Statistics {
        compute(&self.data.lock().store)
    }

    pub fn sample_count(&self) -> usize {
        self.data.lock().store.len()
    }

    /// Time one fetch for `variant` and record it.
    ///
    /// `Busy` and `InvalidSample` are returned straight to the caller.
    /// Transport and server failures are also reported to every sink via
    /// `on_error`; the store is left untouched and nothing is retried.
    ///
    /// Dropping the returned future abandons the attempt; use
    /// [`spawn_test`](Self::spawn_test) when the caller may go away.
    pub async fn run_test(&self, variant: Variant) -> Result<Arc<View>, SessionError> {
        let guard = self.begin(SessionState::Running(variant))?;
        tracing::debug!(session = %self.id, %variant, "running test");

        let sample = match self.source.fetch_outcome(variant).await {
            Ok(sample) => sample,
            Err(e) => return Err(self.surface_failure(&guard, e)),
        };

        let latency_ms = sample.latency_ms;
        let cache_hit = sample.cache_hit;
        let view = match self.mutate(|data| data.push(sample)) {
            Ok(view) => view,
            Err(e) => {
                tracing::error!(session = %self.id, %variant, error = %e, "sample rejected");
                return Err(e.into());
            }
        };

        tracing::info!(
            session = %self.id,
            %variant,
            latency_ms,
            cache_hit = ?cache_hit,
            total = view.statistics.total_requests,
            "test completed"
        );
        // Still holding the slot, so no later view can be delivered first
        self.notify(|sink| sink.on_view_updated(&view));
        drop(guard);
        Ok(view)
    }

    /// Ask the source to drop its server-side cache.
    /// The local sample history is not touched.
    pub async fn clear_cache(&self) -> Result<(), SessionError> {
        let guard = self.begin(SessionState::ClearingCache)?;
        tracing::debug!(session = %self.id, "clearing origin cache");

        if let Err(e) = self.source.clear_cache().await {
            return Err(self.surface_failure(&guard, e));
        }
        Ok(())
    }

    /// Wipe the sample history and publish the all-zero view.
    pub fn clear_results(&self) -> Result<Arc<View>, SessionError> {
        let guard = self.begin(SessionState::ClearingResults)?;
        let view = self.mutate(|data| {
            data.clear();
            Ok(())
        })?;

        tracing::info!(session = %self.id, "results cleared");
        self.notify(|sink| sink.on_view_updated(&view));
        drop(guard);
        Ok(view)
    }

    // ── Internals ────────────────────────────────────────────────

    /// Atomically claim the in-flight slot, or reject with `Busy`.
    fn begin(&self, next: SessionState) -> Result<InFlight<'_>, SessionError> {
        {
            let mut state = self.state.lock();
            if *state == SessionState::Idle {
                *state = next;
                return Ok(InFlight { state: &self.state });
            }
        }
        Err(self.reject_busy())
    }

    fn reject_busy(&self) -> SessionError {
        tracing::debug!(session = %self.id, state = ?self.state(), "busy");
        self.notify(|sink| sink.on_busy());
        SessionError::Busy
    }

    /// Enter `Error(message)`, tell the sinks, and hand the error back.
    /// The guard returns the session to `Idle` once the caller drops it.
    fn surface_failure(&self, guard: &InFlight<'_>, e: FetchError) -> SessionError {
        let connectivity = e.is_connectivity();
        let err = SessionError::from(e);
        let message = err.to_string();
        tracing::warn!(session = %self.id, connectivity, error = %message, "attempt failed");
        guard.fail(message.clone());
        self.notify(|sink| sink.on_error(&message));
        err
    }

    /// Apply `f` to the store and publish the resulting view in one step.
    fn mutate(
        &self,
        f: impl FnOnce(&mut Data) -> Result<(), InvalidSample>,
    ) -> Result<Arc<View>, InvalidSample> {
        let mut data = self.data.lock();
        f(&mut data)?;
        let view = Arc::new(data.view(self.recent_window));
        *self.view.lock() = Arc::clone(&view);
        Ok(view)
    }

    fn notify(&self, f: impl Fn(&dyn DisplaySink)) {
        let sinks = self.sinks.read().clone();
        for sink in &sinks {
            f(sink.as_ref());
        }
    }
}
