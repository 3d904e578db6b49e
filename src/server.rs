use axum::{
    middleware as axum_mw,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::timing;
use crate::source::SampleSource;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router<S: SampleSource + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        // ── Session control ─────────────────────────────────────
        .route("/api/tests/:variant", post(handlers::session::run_test::<S>))
        .route("/api/cache/clear", post(handlers::session::clear_cache::<S>))
        .route("/api/results", delete(handlers::session::clear_results::<S>))
        .route("/api/session", get(handlers::session::session_status::<S>))
        // ── View ────────────────────────────────────────────────
        .route("/api/view", get(handlers::view::get_view::<S>))
        .route("/api/view/stream", get(handlers::view::view_stream::<S>))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}
