//! HTTP implementation of the chat backend

use super::types::{ChatReply, ChatRequest, ChatResponseBody};
use super::{ChatBackend, ChatError};
use async_trait::async_trait;
use reqwest::Client;

/// Talks to `POST {base_url}/chat/`.
///
/// Exactly one attempt per call; no timeout beyond what the transport
/// enforces on its own.
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/", base_url.trim_end_matches('/')),
        }
    }

    fn parse_reply(body: &str) -> Result<ChatReply, ChatError> {
        let parsed: ChatResponseBody = serde_json::from_str(body)
            .map_err(|e| ChatError::malformed(format!("Failed to parse response: {e}")))?;

        if parsed.response.trim().is_empty() {
            return Err(ChatError::malformed("Response field is empty"));
        }

        Ok(ChatReply {
            text: parsed.response,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        let request = ChatRequest::user(text, conversation_id);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::connection(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::connection(format!("Connection failed: {e}"))
                } else {
                    ChatError::connection(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::http_status(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::connection(format!("Failed to read response: {e}")))?;

        Self::parse_reply(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
