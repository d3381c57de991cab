//! Chat backend abstraction
//!
//! One request per user turn, one reply or one classified error back.

mod error;
mod http;
mod types;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatClient;
pub use types::{ChatReply, ChatRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat endpoints
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and wait for the reply
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError>;

    /// Where requests go, for logs and the status line
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        (**self).send(text, conversation_id).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for chat backends
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: ChatBackend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<B: ChatBackend> ChatBackend for LoggingBackend<B> {
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(text, conversation_id).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    conversation_id = %conversation_id,
                    duration_ms = %duration.as_millis(),
                    reply_chars = reply.text.chars().count(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.inner.endpoint(),
                    conversation_id = %conversation_id,
                    duration_ms = %duration.as_millis(),
                    kind = %e.kind,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
