use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};

/// Stamps every response with its handler wall time and logs API requests.
///
/// Headers: `X-Response-Time-Us` (integer μs) and `Server-Timing`
/// (`total;dur=<ms>`).
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let elapsed = start.elapsed();
    stamp(response.headers_mut(), elapsed);

    // SSE connections stay open; their duration says nothing useful
    if path.starts_with("/api/") && !path.ends_with("/stream") {
        let status = response.status();
        let us = elapsed.as_micros() as u64;
        if status.is_server_error() {
            tracing::warn!(%method, %path, status = status.as_u16(), us, "request");
        } else {
            tracing::info!(%method, %path, status = status.as_u16(), us, "request");
        }
    }

    response
}

fn stamp(headers: &mut HeaderMap, elapsed: Duration) {
    headers.insert(
        "x-response-time-us",
        HeaderValue::from(elapsed.as_micros() as u64),
    );
    let dur = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(value) = HeaderValue::from_str(&dur) {
        headers.insert("server-timing", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_writes_both_headers() {
        let mut headers = HeaderMap::new();
        stamp(&mut headers, Duration::from_micros(1_500));
        assert_eq!(headers["x-response-time-us"], "1500");
        assert_eq!(headers["server-timing"], "total;dur=1.500");
    }
}
