use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use ckrv_core::event::OrchestrationEvent;

use crate::{ClientError, Result};

// ─── EventStream ──────────────────────────────────────────────────────────

/// A long-lived stream of [`OrchestrationEvent`]s from `GET /api/events`.
///
/// Backed by a Tokio mpsc channel. A background task owns the HTTP
/// response, reassembles SSE frames from the byte stream, and forwards
/// each decoded event. Malformed payloads are dropped with a warning;
/// the buffer on the consuming side grows only for valid events.
///
/// Dropping `EventStream` closes the receiver, which ends the background
/// task on its next send. When the connection itself ends the stream
/// yields `None` and stays stopped — there is no reconnection.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<OrchestrationEvent>,
}

impl EventStream {
    /// Open the push connection. Fails fast on a non-2xx response;
    /// everything after that is delivered through the stream.
    pub async fn connect(client: &reqwest::Client, base_url: &str) -> Result<Self> {
        let url = format!("{}/api/events", base_url.trim_end_matches('/'));
        let response = client
            .get(&url)
            .header("Accept", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut parser = SseParser::default();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("event stream read failed: {e}");
                        break;
                    }
                };
                for payload in parser.feed(&chunk) {
                    match OrchestrationEvent::decode(&payload) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                return; // Receiver dropped
                            }
                        }
                        Err(e) => tracing::warn!("dropping malformed event: {e}"),
                    }
                }
            }
            // Connection ended; a final partial frame without its blank
            // line is discarded, matching browser EventSource behavior.
        });

        Ok(Self { rx })
    }

    /// Test-only constructor: wrap a raw mpsc receiver as an `EventStream`.
    #[cfg(test)]
    pub(crate) fn from_channel(rx: mpsc::Receiver<OrchestrationEvent>) -> Self {
        Self { rx }
    }
}

impl Stream for EventStream {
    type Item = OrchestrationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ─── SseParser ────────────────────────────────────────────────────────────

/// Incremental server-sent-events frame reassembly.
///
/// Accumulates `data:` lines until a blank line dispatches the frame.
/// Comment lines (leading `:`, used by keep-alives) and non-data fields
/// (`event:`, `id:`, `retry:`) are ignored. Handles CRLF and chunk
/// boundaries that split lines.
///
/// The buffer holds raw bytes; decoding happens per complete line. A
/// chunk boundary can land mid-character, so decoding per chunk would
/// mangle multi-byte UTF-8.
#[derive(Default)]
struct SseParser {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl SseParser {
    /// Feed one chunk of bytes; returns the data payloads of every frame
    /// completed by this chunk.
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    payloads.push(self.data.join("\n"));
                    self.data.clear();
                }
            } else if let Some(rest) = line.strip_prefix("data:") {
                self.data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
            // ':' comments and other fields fall through
        }
        payloads
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ckrv_core::event::EventKind;

    #[test]
    fn parser_dispatches_on_blank_line() {
        let mut parser = SseParser::default();
        let frames = parser.feed(b"data: {\"message\":\"hi\"}\n\n");
        assert_eq!(frames, vec![r#"{"message":"hi"}"#.to_string()]);
    }

    #[test]
    fn parser_joins_multi_line_data() {
        let mut parser = SseParser::default();
        let frames = parser.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(frames, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn parser_survives_split_chunks() {
        let mut parser = SseParser::default();
        assert!(parser.feed(b"data: {\"mess").is_empty());
        assert!(parser.feed(b"age\":\"split\"}\n").is_empty());
        let frames = parser.feed(b"\n");
        assert_eq!(frames, vec![r#"{"message":"split"}"#.to_string()]);
    }

    #[test]
    fn parser_ignores_comments_and_other_fields() {
        let mut parser = SseParser::default();
        let frames = parser.feed(b": keep-alive\nevent: update\nid: 7\ndata: x\n\n");
        assert_eq!(frames, vec!["x".to_string()]);
    }

    #[test]
    fn parser_keeps_multibyte_chars_split_across_chunks() {
        let mut parser = SseParser::default();
        // "café" with the é's two UTF-8 bytes landing in different chunks.
        assert!(parser.feed(b"data: {\"message\":\"caf\xc3").is_empty());
        let frames = parser.feed(b"\xa9\"}\n\n");
        assert_eq!(frames, vec!["{\"message\":\"caf\u{e9}\"}".to_string()]);
    }

    #[test]
    fn parser_handles_crlf() {
        let mut parser = SseParser::default();
        let frames = parser.feed(b"data: x\r\n\r\n");
        assert_eq!(frames, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn stream_yields_valid_events_in_order() {
        let mut server = mockito::Server::new_async().await;
        // Finite SSE body: three valid frames with one malformed frame
        // interleaved. The connection closes after the body, ending the
        // stream.
        let body = concat!(
            "data: {\"type\":\"step_start\",\"message\":\"one\"}\n\n",
            "data: this is not json\n\n",
            "data: {\"type\":\"log\",\"message\":\"two\"}\n\n",
            ": keep-alive\n",
            "data: {\"type\":\"success\",\"message\":\"three\"}\n\n",
        );
        let _mock = server
            .mock("GET", "/api/events")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let stream = EventStream::connect(&client, &server.url()).await.unwrap();
        let events: Vec<OrchestrationEvent> = stream.collect().await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, EventKind::StepStart);
        assert_eq!(events[0].message, "one");
        assert_eq!(events[1].message, "two");
        assert_eq!(events[2].kind, EventKind::Success);
    }

    #[tokio::test]
    async fn connect_fails_on_non_2xx() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/events")
            .with_status(503)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let err = EventStream::connect(&client, &server.url()).await.unwrap_err();
        match err {
            ClientError::Status { status, .. } => assert_eq!(status, 503),
            other => panic!("expected Status error, got {other}"),
        }
    }

    #[tokio::test]
    async fn from_channel_terminates_when_sender_drops() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = EventStream::from_channel(rx);
        tx.send(OrchestrationEvent::new(EventKind::Log, "only"))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(stream.next().await.unwrap().message, "only");
        assert!(stream.next().await.is_none());
    }
}
