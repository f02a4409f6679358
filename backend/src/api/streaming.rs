//! Streaming utilities for Server-Sent Events (SSE)
//!
//! Turns the event channel of a streamed shell command into an SSE response.

use crate::error::AppError;
use crate::executor::ShellEvent;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use futures_util::{stream::Stream, StreamExt};
use tokio::sync::mpsc;

/// SSE stream termination signal
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

/// SSE error prefix
pub const SSE_ERROR_PREFIX: &str = "[ERROR]";

/// Render a shell event as the payload of one `data:` line
pub fn event_payload(event: &ShellEvent) -> String {
    match event {
        ShellEvent::Line(line) => line.clone(),
        ShellEvent::Exited(Some(code)) => format!("[EXIT {}]", code),
        ShellEvent::Exited(None) => "[EXIT killed]".to_string(),
        ShellEvent::Failed(message) => format!("{} {}", SSE_ERROR_PREFIX, message),
    }
}

/// Frame a payload as one SSE event
///
/// SSE treats `\r` and `\n` as line terminators, so progress output that
/// redraws with `\r` is split into one `data:` line per segment.
pub fn sse_frame(payload: &str) -> String {
    let mut frame = String::with_capacity(payload.len() + 8);
    for segment in payload.split(|c| c == '\r' || c == '\n') {
        frame.push_str("data: ");
        frame.push_str(segment);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Create an SSE response from a shell event channel
pub fn create_sse_stream(rx: mpsc::Receiver<ShellEvent>) -> Result<Response, AppError> {
    let sse_stream =
        create_stream(rx).map(|payload| Ok::<_, std::io::Error>(sse_frame(&payload)));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build SSE response: {}", e)))
}

/// Payloads for every event, followed by the done signal
fn create_stream(mut rx: mpsc::Receiver<ShellEvent>) -> impl Stream<Item = String> {
    use async_stream::stream;

    stream! {
        while let Some(event) = rx.recv().await {
            yield event_payload(&event);
        }
        yield SSE_DONE_SIGNAL.to_string();
    }
}
