pub mod session;
pub mod view;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::SessionError;

// ─── Shared response bodies ──────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    Busy,
    InvalidSample(String),
    Transport(String),
    Server(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy => Self::Busy,
            SessionError::InvalidSample(e) => Self::InvalidSample(e.to_string()),
            SessionError::TransportFailure(msg) => Self::Transport(msg),
            SessionError::ServerFailure(msg) => Self::Server(msg),
        }
    }
}

/// A spawned session task panicked or was aborted.
impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("session task failed: {err}"))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Busy => StatusCode::CONFLICT,
            Self::InvalidSample(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::Server(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Busy => "Another test is already running".into(),
            Self::InvalidSample(msg) => format!("Invalid sample: {msg}"),
            Self::Transport(msg) => format!("Cannot reach the origin: {msg}"),
            Self::Server(msg) => format!("Origin error: {msg}"),
            Self::Internal(msg) => msg,
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
