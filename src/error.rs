use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::metrics::Variant;
use crate::source::FetchError;

/// A sample that must never enter the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSample {
    #[error("cacheHit must be set if and only if the variant is cached (got {variant})")]
    CacheHitMismatch { variant: Variant },
    #[error("latency must be a finite non-negative number of milliseconds (got {0})")]
    InvalidLatency(f64),
    #[error("sample captured at {got} precedes the last stored sample at {last}")]
    OutOfOrder {
        last: DateTime<Utc>,
        got: DateTime<Utc>,
    },
}

/// Everything a session operation can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("invalid sample: {0}")]
    InvalidSample(#[from] InvalidSample),
    #[error("another operation is already in flight")]
    Busy,
    #[error("cannot reach the origin: {0}")]
    TransportFailure(String),
    #[error("origin reported an error: {0}")]
    ServerFailure(String),
}

impl From<FetchError> for SessionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport(msg) => SessionError::TransportFailure(msg),
            FetchError::Server(msg) => SessionError::ServerFailure(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
