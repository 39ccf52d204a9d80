use std::time::Instant;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, info_span, warn, Instrument};

/// Request logging. Health checks are skipped; handler logs run inside a
/// `request` span carrying method and path.
///
/// For streamed chat responses `duration_ms` is the time to the first byte.
pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if path == "/health" {
        return next.run(req).await;
    }

    let method = req.method().to_string();
    let span = info_span!("request", method = %method, path = %path);
    let start = Instant::now();

    let response = next.run(req).instrument(span).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();
    let streamed = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain"));

    match status {
        500.. => error!(method, path, status, duration_ms, "request failed"),
        400..=499 => warn!(method, path, status, duration_ms, "request rejected"),
        _ => info!(method, path, status, duration_ms, streamed, "request"),
    }

    response
}
