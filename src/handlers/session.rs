use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::metrics::Variant;
use crate::session::{SessionState, View};
use crate::source::SampleSource;
use crate::AppState;

use super::{AppError, StatusMessage};

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: SessionState,
    pub samples: usize,
}

// ─── POST /api/tests/:variant ────────────────────────────────────

pub async fn run_test<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(variant): Path<Variant>,
) -> Result<Json<Arc<View>>, AppError> {
    // Spawned so a client disconnect cannot cut the fetch short
    let view = state.session.spawn_test(variant).await??;
    Ok(Json(view))
}

// ─── POST /api/cache/clear ───────────────────────────────────────

pub async fn clear_cache<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<StatusMessage>, AppError> {
    state.session.spawn_clear_cache().await??;
    Ok(Json(StatusMessage {
        message: "Cache cleared".into(),
    }))
}

// ─── DELETE /api/results ─────────────────────────────────────────

pub async fn clear_results<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Arc<View>>, AppError> {
    let view = state.session.clear_results()?;
    Ok(Json(view))
}

// ─── GET /api/session ────────────────────────────────────────────

pub async fn session_status<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<SessionStatus> {
    Json(SessionStatus {
        session_id: state.session.id(),
        state: state.session.state(),
        samples: state.session.sample_count(),
    })
}
