//! HTTP transport for the remote session client
//!
//! Each operation carries its own timeout; timeout, network error and
//! non-success status all resolve to the operation's fallback value with a
//! logged diagnostic, so no error crosses this boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use widget_core::{ChatBackend, Message, UiTexts, WidgetConfig};

use crate::error::{ClientError, Result};
use crate::stream::{MessageStream, StreamEvent};

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ReplyResponse {
    reply: Option<String>,
}

/// Remote session client over HTTP, with optional WebSocket streaming
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    ws_base_url: String,
    create_timeout: Duration,
    delete_timeout: Duration,
    generate_timeout: Duration,
    stream_enabled: bool,
    fallback_reply: String,
}

impl HttpBackend {
    /// Create a new backend client from the widget configuration
    pub fn new(config: &WidgetConfig, texts: &UiTexts) -> Result<Self> {
        let client = Client::builder().build().map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: config.api.base_url.clone(),
            ws_base_url: config.ws_base_url(),
            create_timeout: Duration::from_millis(config.timeouts.create_session_ms),
            delete_timeout: Duration::from_millis(config.timeouts.delete_session_ms),
            generate_timeout: Duration::from_millis(config.timeouts.generate_message_ms),
            stream_enabled: config.stream.enabled,
            fallback_reply: texts.error_message.clone(),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/chatbot/{}", self.base_url, endpoint)
    }

    /// Issue a request and parse the JSON response.
    ///
    /// All failure modes collapse into `None` after logging: the caller
    /// substitutes its fallback value.
    async fn call_api<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Option<T> {
        match self.request(method, endpoint, body, timeout).await {
            Ok(value) => Some(value),
            Err(ClientError::Http(e)) if e.is_timeout() => {
                error!("API request to {} timed out after {:?}", endpoint, timeout);
                None
            }
            Err(e) => {
                error!("API error calling {}: {}", endpoint, e);
                None
            }
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        debug!("Sending {} request to {}", method, url);

        let mut request = self.client.request(method, &url).timeout(timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ClientError::Http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        response.json::<T>().await.map_err(ClientError::Http)
    }

    /// Exchange a message over the streaming transport, accumulating tokens
    /// into one complete reply.
    async fn exchange_streamed(&self, session_id: &str, text: &str) -> Message {
        let url = format!(
            "{}/api/chatbot/sessions/{}/stream",
            self.ws_base_url, session_id
        );

        let (stream, mut events) = MessageStream::open(&url);
        stream.send(text);

        let mut reply = String::new();
        let collect = async {
            while let Some(event) = events.recv().await {
                match event {
                    StreamEvent::Token(token) => reply.push_str(&token),
                    StreamEvent::End => break,
                    StreamEvent::Error(e) => {
                        error!("Stream error for session {}: {}", session_id, e);
                    }
                }
            }
        };

        if tokio::time::timeout(self.generate_timeout, collect).await.is_err() {
            error!(
                "Streamed exchange for session {} timed out after {:?}",
                session_id, self.generate_timeout
            );
        }
        stream.close();

        if reply.is_empty() {
            reply = self.fallback_reply.clone();
        }
        Message::bot(reply)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn create_session(&self) -> String {
        let data: Option<SessionResponse> = self
            .call_api(Method::POST, "sessions", None, self.create_timeout)
            .await;

        match data {
            Some(r) if !r.session_id.is_empty() => r.session_id,
            Some(_) => {
                error!("Failed to create chat session: session_id missing in response");
                String::new()
            }
            None => String::new(),
        }
    }

    async fn send_message(&self, session_id: &str, text: &str) -> Message {
        if self.stream_enabled {
            return self.exchange_streamed(session_id, text).await;
        }

        let data: Option<ReplyResponse> = self
            .call_api(
                Method::POST,
                &format!("sessions/{}/message", session_id),
                Some(serde_json::json!({ "message": text })),
                self.generate_timeout,
            )
            .await;

        // An empty reply and a broken exchange are indistinguishable here;
        // both resolve to the fallback text.
        let reply = data
            .and_then(|d| d.reply)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.fallback_reply.clone());

        Message::bot(reply)
    }

    async fn delete_session(&self, session_id: &str) {
        let url = self.endpoint_url(&format!("sessions/{}", session_id));

        match self.client.delete(&url).timeout(self.delete_timeout).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    "Failed to delete session {}: {}",
                    session_id,
                    response.status()
                );
            }
            Ok(_) => debug!("Deleted remote session {}", session_id),
            Err(e) => warn!("Failed to delete session {}: {}", session_id, e),
        }
    }
}
