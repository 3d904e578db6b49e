use std::sync::Arc;

use cache_latency_lab::source::{redis_cache, Origin, RedisSampleSource};
use cache_latency_lab::{logging, server, AppState, Config, LogSink, SessionController};

/// Fixed so every run serves the same catalog.
const CATALOG_SEED: u64 = 42;
const EVENT_CAPACITY: usize = 64;

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init() {
        eprintln!("{e}");
    }

    if let Err(e) = run().await {
        tracing::error!(error = %e, "exiting");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // ── 1. Connect to Redis ──────────────────────────────────────
    tracing::info!(url = %config.redis_url, "connecting to Redis");
    let conn = redis_cache::connect(&config.redis_url).await?;

    // ── 2. Seed the origin ───────────────────────────────────────
    let origin = Arc::new(Origin::seeded(
        config.catalog_size,
        CATALOG_SEED,
        config.origin_delay_ms.clone(),
    ));
    tracing::info!(
        items = origin.len(),
        delay_ms = ?config.origin_delay_ms,
        "origin catalog seeded"
    );

    // ── 3. Build the session and its displays ────────────────────
    let source = RedisSampleSource::new(conn, origin, config.cache_ttl_secs);
    let session = Arc::new(SessionController::new(source, config.recent_window));
    session.subscribe(Arc::new(LogSink));
    let state = Arc::new(AppState::new(Arc::clone(&session), EVENT_CAPACITY));
    tracing::info!(session = %session.id(), "session started");

    // ── 4. Bind & serve ──────────────────────────────────────────
    let app = server::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening (view: /api/view, stream: /api/view/stream)");

    axum::serve(listener, app).await?;
    Ok(())
}
