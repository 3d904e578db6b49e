use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::session::View;
use crate::sink::SinkEvent;
use crate::source::SampleSource;
use crate::AppState;

// ─── GET /api/view ───────────────────────────────────────────────
/// Returns the current view as JSON, handy for curl.

pub async fn get_view<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Arc<View>> {
    Json(state.session.view())
}

// ─── GET /api/view/stream ────────────────────────────────────────
/// Server-Sent Events endpoint.
/// Sends the current view first, then every sink notification as it
/// happens. The browser's `EventSource` connects here.

pub async fn view_stream<S: SampleSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading the view so no update falls in between
    let rx = state.events.subscribe();
    let initial = SinkEvent::View(state.session.view());

    let updates = BroadcastStream::new(rx).filter_map(|event| match event {
        Ok(event) => Some(event),
        Err(lagged) => {
            tracing::debug!(error = %lagged, "view stream subscriber lagged");
            None
        }
    });

    let stream = tokio_stream::once(initial)
        .chain(updates)
        .map(|event| Ok(to_sse(&event)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse(event: &SinkEvent) -> Event {
    let name = match event {
        SinkEvent::View(_) => "view",
        SinkEvent::Error(_) => "error",
        SinkEvent::Busy => "busy",
    };
    let json = serde_json::to_string(event).unwrap_or_default();
    Event::default().event(name).data(json)
}
