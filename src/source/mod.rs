//! Where samples come from.
//!
//! A [`SampleSource`] performs one timed fetch against either variant and
//! can ask the origin to drop its cache. Fetches are the only suspension
//! points of a session.

pub mod origin;
pub mod redis_cache;

use std::future::Future;
use thiserror::Error;

use crate::metrics::{Sample, Variant};

pub use self::origin::{CatalogItem, Origin};
pub use self::redis_cache::RedisSampleSource;

/// Why a fetch or cache clear did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The origin (or the cache in front of it) could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The origin was reachable but answered with an error.
    #[error("server failure: {0}")]
    Server(String),
}

impl FetchError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

pub trait SampleSource: Send + Sync {
    /// Perform one timed request for `variant`.
    ///
    /// On success the sample carries the measured latency, `cache_hit` only
    /// for the cached variant, and the payload length as `item_count`.
    fn fetch_outcome(
        &self,
        variant: Variant,
    ) -> impl Future<Output = Result<Sample, FetchError>> + Send;

    /// Ask the origin to invalidate its cache.
    fn clear_cache(&self) -> impl Future<Output = Result<(), FetchError>> + Send;
}
