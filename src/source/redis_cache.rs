use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};
use std::sync::Arc;
use std::time::Instant;

use super::{CatalogItem, FetchError, Origin, SampleSource};
use crate::metrics::{Sample, Variant};

/// Redis key holding the cached catalog as JSON.
pub const CACHE_KEY: &str = "lab:cache:catalog";

/// Creates a single `ConnectionManager` that auto-reconnects on failure.
///
/// `ConnectionManager` is cheaply cloneable; every clone shares the same
/// underlying multiplexed TCP connection.
pub async fn connect(url: &str) -> Result<ConnectionManager, FetchError> {
    let client = redis::Client::open(url)
        .map_err(|e| FetchError::Transport(format!("invalid Redis URL {url:?}: {e}")))?;
    Ok(ConnectionManager::new(client).await?)
}

impl From<RedisError> for FetchError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout()
        {
            FetchError::Transport(e.to_string())
        } else {
            FetchError::Server(e.to_string())
        }
    }
}

/// Times catalog fetches through a Redis read-through cache (cached
/// variant) or straight against the origin (uncached variant).
#[derive(Clone)]
pub struct RedisSampleSource {
    conn: ConnectionManager,
    origin: Arc<Origin>,
    ttl_secs: u64,
}

impl RedisSampleSource {
    pub fn new(conn: ConnectionManager, origin: Arc<Origin>, ttl_secs: u64) -> Self {
        Self {
            conn,
            origin,
            ttl_secs,
        }
    }

    /// Returns the catalog and whether it came out of Redis.
    async fn read_through(&self) -> Result<(Vec<CatalogItem>, bool), FetchError> {
        let mut conn = self.conn.clone();

        let cached: Option<String> = conn.get(CACHE_KEY).await?;
        if let Some(json) = cached {
            let items = serde_json::from_str(&json)
                .map_err(|e| FetchError::Server(format!("corrupt cache entry: {e}")))?;
            return Ok((items, true));
        }

        // Miss: fall through to the origin and populate
        let items = self.origin.load().await;
        let json = serde_json::to_string(&items)
            .map_err(|e| FetchError::Server(format!("cannot encode catalog: {e}")))?;
        let _: () = conn.set_ex(CACHE_KEY, json, self.ttl_secs).await?;

        Ok((items, false))
    }
}

impl SampleSource for RedisSampleSource {
    async fn fetch_outcome(&self, variant: Variant) -> Result<Sample, FetchError> {
        let t0 = Instant::now();

        // ── Timed section ───────────────────────────────────────
        let sample = match variant {
            Variant::Cached => {
                let (items, hit) = self.read_through().await?;
                let latency_ms = t0.elapsed().as_secs_f64() * 1000.0;
                Sample::cached(latency_ms, hit, items.len() as u64)
            }
            Variant::Uncached => {
                let items = self.origin.load().await;
                let latency_ms = t0.elapsed().as_secs_f64() * 1000.0;
                Sample::uncached(latency_ms, items.len() as u64)
            }
        };
        // ────────────────────────────────────────────────────────

        tracing::debug!(
            %variant,
            latency_ms = sample.latency_ms,
            cache_hit = ?sample.cache_hit,
            "fetch completed"
        );
        Ok(sample)
    }

    async fn clear_cache(&self) -> Result<(), FetchError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(CACHE_KEY).await?;
        tracing::info!(removed, key = CACHE_KEY, "cache cleared");
        Ok(())
    }
}
