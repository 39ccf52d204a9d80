use std::convert::Infallible;
use std::fmt::Display;

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::{Stream, StreamExt};
use memchr::memchr;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::protocol::{ChatCompletionChunk, ErrorResponse, StreamDelta};

/// Terminal event, sent exactly once per stream.
pub const DONE_EVENT: &str = "data: [DONE]\n\n";

/// Events buffered between the upstream reader and the client.
const EVENT_BUFFER: usize = 32;

const STREAM_ERROR: &str = "Failed to process chat request";

pub fn delta_event(content: &str) -> String {
    let payload = serde_json::to_string(&StreamDelta { content }).unwrap_or_default();
    format!("data: {payload}\n\n")
}

pub fn error_event(details: &str) -> String {
    let payload = serde_json::to_string(&ErrorResponse {
        error: STREAM_ERROR.to_string(),
        details: Some(details.to_string()),
    })
    .unwrap_or_default();
    format!("data: {payload}\n\n")
}

/// Relay an upstream SSE completion stream to the client as it arrives.
pub fn relay(upstream: reqwest::Response) -> Response {
    let (tx, rx) = mpsc::channel::<String>(EVENT_BUFFER);
    tokio::spawn(pump(upstream.bytes_stream(), tx));

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(body)
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

/// What a single upstream line means for the relay.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Delta(String),
    Error(String),
    Done,
    Skip,
}

fn parse_line(line: &str) -> Line {
    let Some(payload) = line.strip_prefix("data:").map(str::trim) else {
        return Line::Skip;
    };

    if payload == "[DONE]" {
        return Line::Done;
    }
    if payload.is_empty() {
        return Line::Skip;
    }

    let value = match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => value,
        Err(e) => {
            debug!(payload, error = %e, "skipping unparseable stream line");
            return Line::Skip;
        }
    };
    if value.get("error").is_some() {
        return Line::Error(super::proxy::error_summary(payload));
    }

    match serde_json::from_value::<ChatCompletionChunk>(value) {
        Ok(chunk) => match chunk.content() {
            Some(content) => Line::Delta(content.to_string()),
            None => Line::Skip,
        },
        Err(e) => {
            debug!(payload, error = %e, "skipping unrecognized stream line");
            Line::Skip
        }
    }
}

/// Read upstream bytes, forward ordered events, then close with [`DONE_EVENT`].
///
/// Returns early without the terminal event only when the client went away.
pub async fn pump<S, B, E>(upstream: S, tx: mpsc::Sender<String>)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut upstream = std::pin::pin!(upstream);
    let mut buffer: Vec<u8> = Vec::new();

    'read: while let Some(chunk) = upstream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "error reading upstream stream");
                if tx.send(error_event(&e.to_string())).await.is_err() {
                    return;
                }
                break;
            }
        };
        buffer.extend_from_slice(chunk.as_ref());

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
            match forward_line(&line, &tx).await {
                Forwarded::Continue => {}
                Forwarded::Finished => {
                    buffer.clear();
                    break 'read;
                }
                Forwarded::Disconnected => return,
            }
        }
    }

    if !buffer.is_empty() {
        let line = std::mem::take(&mut buffer);
        if let Forwarded::Disconnected = forward_line(&line, &tx).await {
            return;
        }
    }

    if tx.send(DONE_EVENT.to_string()).await.is_err() {
        debug!("client disconnected before end of stream");
    }
}

enum Forwarded {
    Continue,
    Finished,
    Disconnected,
}

async fn forward_line(raw: &[u8], tx: &mpsc::Sender<String>) -> Forwarded {
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s.trim(),
        Err(e) => {
            warn!(error = %e, "invalid UTF-8 in upstream stream");
            return Forwarded::Continue;
        }
    };

    let event = match parse_line(line) {
        Line::Delta(content) => delta_event(&content),
        Line::Error(details) => {
            if tx.send(error_event(&details)).await.is_err() {
                return Forwarded::Disconnected;
            }
            return Forwarded::Finished;
        }
        Line::Done => return Forwarded::Finished,
        Line::Skip => return Forwarded::Continue,
    };

    if tx.send(event).await.is_err() {
        debug!("client disconnected, dropping remaining upstream output");
        return Forwarded::Disconnected;
    }
    Forwarded::Continue
}
