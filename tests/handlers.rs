//! HTTP handlers called directly with their extractors.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use cache_latency_lab::handlers::{self, AppError};
use cache_latency_lab::sink::SinkEvent;
use cache_latency_lab::{AppState, FetchError, Sample, SampleSource, SessionController, Variant};

/// Cached fetches always hit; uncached fetches always fail.
struct HalfBroken;

impl SampleSource for HalfBroken {
    async fn fetch_outcome(&self, variant: Variant) -> Result<Sample, FetchError> {
        match variant {
            Variant::Cached => Ok(Sample::cached(2.5, true, 8)),
            Variant::Uncached => Err(FetchError::Server("origin unavailable".into())),
        }
    }

    async fn clear_cache(&self) -> Result<(), FetchError> {
        Ok(())
    }
}

fn app_state() -> Arc<AppState<HalfBroken>> {
    let session = Arc::new(SessionController::new(HalfBroken, 10));
    Arc::new(AppState::new(session, 16))
}

#[tokio::test]
async fn run_test_returns_updated_view_and_broadcasts_it() {
    let state = app_state();
    let mut events = state.events.subscribe();

    let view = handlers::session::run_test(State(state.clone()), Path(Variant::Cached))
        .await
        .unwrap()
        .0;

    assert_eq!(view.statistics.cached.hit_rate, 100.0);
    assert!(matches!(events.try_recv(), Ok(SinkEvent::View(v)) if v == view));

    let current = handlers::view::get_view(State(state)).await.0;
    assert_eq!(current, view);
}

#[tokio::test]
async fn failing_test_maps_to_server_error() {
    let state = app_state();
    let mut events = state.events.subscribe();

    let err = handlers::session::run_test(State(state.clone()), Path(Variant::Uncached))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Server(ref m) if m == "origin unavailable"));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(matches!(events.try_recv(), Ok(SinkEvent::Error(m)) if m.contains("origin unavailable")));
}

#[tokio::test]
async fn clear_results_and_status() {
    let state = app_state();
    handlers::session::run_test(State(state.clone()), Path(Variant::Cached))
        .await
        .unwrap();

    let status = handlers::session::session_status(State(state.clone())).await.0;
    assert_eq!(status.samples, 1);

    let view = handlers::session::clear_results(State(state.clone())).await.unwrap().0;
    assert_eq!(view.statistics.total_requests, 0);

    let body = serde_json::to_value(handlers::session::session_status(State(state)).await.0).unwrap();
    assert_eq!(body["state"], "idle");
    assert_eq!(body["samples"], 0);
}

#[tokio::test]
async fn clear_cache_answers_with_message() {
    let state = app_state();
    let reply = handlers::session::clear_cache(State(state)).await.unwrap().0;
    assert_eq!(reply.message, "Cache cleared");
}
