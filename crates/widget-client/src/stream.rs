//! WebSocket streaming transport
//!
//! Delivers a reply as successive token fragments instead of one complete
//! response. An exchange is a subscription: `MessageStream::open` yields a
//! handle plus an event receiver, the handle sends user text and can close
//! the channel at any point.
//!
//! Messages sent before the socket finishes opening are queued and flushed
//! exactly once after the open transition, so the open race loses nothing
//! and duplicates nothing.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, warn};

/// Event delivered by a streaming exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental reply fragment, in arrival order
    Token(String),
    /// Server signalled completion; emitted exactly once
    End,
    /// Channel failure or unparsable server frame
    Error(String),
}

/// Server frame: one of `{token}`, `{end: true}`, `{error}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerFrame {
    Token { token: String },
    End { end: bool },
    Error { error: String },
}

fn parse_frame(text: &str) -> StreamEvent {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(ServerFrame::Token { token }) => StreamEvent::Token(token),
        // Completion is signalled by `{"end": true}` only
        Ok(ServerFrame::End { end: true }) => StreamEvent::End,
        Ok(ServerFrame::Error { error }) => StreamEvent::Error(error),
        Ok(ServerFrame::End { end: false }) | Err(_) => {
            StreamEvent::Error("Invalid message format".to_string())
        }
    }
}

/// Handle to an open streaming exchange
pub struct MessageStream {
    outgoing: mpsc::UnboundedSender<String>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MessageStream {
    /// Open a streaming channel to the given URL.
    ///
    /// The connection is established in a background task; events arrive on
    /// the returned receiver. A connect failure produces a single
    /// `StreamEvent::Error` and ends the exchange.
    pub fn open(url: &str) -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(run_stream(url.to_string(), out_rx, event_tx, shutdown_rx));

        (
            Self {
                outgoing: out_tx,
                shutdown: Some(shutdown_tx),
            },
            event_rx,
        )
    }

    /// Send user text over the channel.
    ///
    /// Queued until the socket is open, then delivered exactly once.
    pub fn send(&self, text: impl Into<String>) {
        if self.outgoing.send(text.into()).is_err() {
            warn!("Stream already closed, dropping outgoing message");
        }
    }

    /// Terminate the channel
    pub fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn run_stream(
    url: String,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<StreamEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // Messages queued while connecting wait in `outgoing` until here
    let ws_stream = tokio::select! {
        connected = connect_async(&url) => match connected {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                error!("WebSocket connect to {} failed: {}", url, e);
                let _ = events.send(StreamEvent::Error(e.to_string()));
                return;
            }
        },
        _ = &mut shutdown => return,
    };

    debug!("Stream open: {}", url);
    let (mut write, mut read) = ws_stream.split();
    let mut outgoing_open = true;

    loop {
        tokio::select! {
            queued = outgoing.recv(), if outgoing_open => {
                match queued {
                    Some(text) => {
                        let frame = serde_json::json!({ "message": text }).to_string();
                        if let Err(e) = write.send(WsMessage::Text(frame.into())).await {
                            error!("WebSocket send error: {}", e);
                            let _ = events.send(StreamEvent::Error(e.to_string()));
                            break;
                        }
                    }
                    // Handle dropped; nothing more to send
                    None => outgoing_open = false,
                }
            }
            message = read.next() => {
                match message {
                    Some(Ok(WsMessage::Text(text))) => {
                        let event = parse_frame(&text);
                        let ended = event == StreamEvent::End;
                        let _ = events.send(event);
                        if ended {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = write.send(WsMessage::Pong(data)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!("WebSocket connection closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        let _ = events.send(StreamEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                let _ = write.send(WsMessage::Close(None)).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::SplitSink;
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::WebSocketStream;

    type ServerSink = SplitSink<WebSocketStream<TcpStream>, WsMessage>;

    async fn send_json(write: &mut ServerSink, value: serde_json::Value) {
        write
            .send(WsMessage::Text(value.to_string().into()))
            .await
            .unwrap();
    }

    /// Accept one WebSocket connection, wait for the client frame, then run
    /// the given script of raw server frames.
    async fn spawn_stream_server(script: Vec<serde_json::Value>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let ws_stream = tokio_tungstenite::accept_async(socket).await.unwrap();
            let (mut write, mut read) = ws_stream.split();

            // The exchange starts with exactly one client frame
            let first = read.next().await.unwrap().unwrap();
            let text = match first {
                WsMessage::Text(text) => text.to_string(),
                other => panic!("Unexpected client frame: {:?}", other),
            };
            let frame: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(frame["message"], "hello");

            for value in script {
                send_json(&mut write, value).await;
            }
        });

        format!("ws://{}", addr)
    }

    async fn collect_events(mut events: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut collected = Vec::new();
        while let Some(event) = events.recv().await {
            let ended = event == StreamEvent::End;
            collected.push(event);
            if ended {
                break;
            }
        }
        collected
    }

    #[tokio::test]
    async fn test_tokens_concatenate_with_single_end() {
        let url = spawn_stream_server(vec![
            serde_json::json!({ "token": "hel" }),
            serde_json::json!({ "token": "lo " }),
            serde_json::json!({ "token": "world" }),
            serde_json::json!({ "end": true }),
        ])
        .await;

        let (stream, events) = MessageStream::open(&url);
        // Sent before the socket reports open; must be buffered, not lost
        stream.send("hello");

        let collected = collect_events(events).await;

        let text: String = collected
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Token(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "hello world");

        let ends = collected.iter().filter(|e| **e == StreamEvent::End).count();
        let errors = collected
            .iter()
            .filter(|e| matches!(e, StreamEvent::Error(_)))
            .count();
        assert_eq!(ends, 1);
        assert_eq!(errors, 0);

        stream.close();
    }

    #[tokio::test]
    async fn test_unparsable_frame_does_not_terminate_channel() {
        let url = spawn_stream_server(vec![
            serde_json::json!({ "unexpected": 42 }),
            serde_json::json!({ "token": "still alive" }),
            serde_json::json!({ "end": true }),
        ])
        .await;

        let (stream, events) = MessageStream::open(&url);
        stream.send("hello");

        let collected = collect_events(events).await;
        assert_eq!(
            collected,
            vec![
                StreamEvent::Error("Invalid message format".to_string()),
                StreamEvent::Token("still alive".to_string()),
                StreamEvent::End,
            ]
        );

        stream.close();
    }

    #[tokio::test]
    async fn test_false_end_frame_does_not_terminate_channel() {
        let url = spawn_stream_server(vec![
            serde_json::json!({ "end": false }),
            serde_json::json!({ "token": "still alive" }),
            serde_json::json!({ "end": true }),
        ])
        .await;

        let (stream, events) = MessageStream::open(&url);
        stream.send("hello");

        let collected = collect_events(events).await;
        assert_eq!(
            collected,
            vec![
                StreamEvent::Error("Invalid message format".to_string()),
                StreamEvent::Token("still alive".to_string()),
                StreamEvent::End,
            ]
        );

        stream.close();
    }

    #[tokio::test]
    async fn test_error_frame_is_delivered() {
        let url = spawn_stream_server(vec![
            serde_json::json!({ "error": "model unavailable" }),
            serde_json::json!({ "end": true }),
        ])
        .await;

        let (stream, events) = MessageStream::open(&url);
        stream.send("hello");

        let collected = collect_events(events).await;
        assert_eq!(collected[0], StreamEvent::Error("model unavailable".to_string()));
        assert_eq!(collected[1], StreamEvent::End);

        stream.close();
    }

    #[tokio::test]
    async fn test_connect_failure_yields_single_error() {
        // Nothing listens here
        let (stream, mut events) = MessageStream::open("ws://127.0.0.1:9");
        stream.send("hello");

        let first = events.recv().await;
        assert!(matches!(first, Some(StreamEvent::Error(_))));
        // Channel ends after the one error
        assert_eq!(events.recv().await, None);

        stream.close();
    }

    #[test]
    fn test_parse_frame_variants() {
        assert_eq!(
            parse_frame(r#"{"token":"abc"}"#),
            StreamEvent::Token("abc".to_string())
        );
        assert_eq!(parse_frame(r#"{"end":true}"#), StreamEvent::End);
        assert_eq!(
            parse_frame(r#"{"end":false}"#),
            StreamEvent::Error("Invalid message format".to_string())
        );
        assert_eq!(
            parse_frame(r#"{"error":"boom"}"#),
            StreamEvent::Error("boom".to_string())
        );
        assert_eq!(
            parse_frame("not json"),
            StreamEvent::Error("Invalid message format".to_string())
        );
    }
}
