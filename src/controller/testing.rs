//! Mock backends for testing
//!
//! These mocks let the controller run end to end without a network.

use crate::client::{ChatBackend, ChatError, ChatReply, ChatRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

// ============================================================================
// Mock Backend
// ============================================================================

/// Backend that returns queued outcomes immediately
pub struct MockBackend {
    outcomes: Mutex<VecDeque<Result<ChatReply, ChatError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<ChatRequest>>,
    panics: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            panics: false,
        }
    }

    /// Every call panics instead of answering
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.outcomes.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: ChatError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record_and_pop(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        self.requests
            .lock()
            .unwrap()
            .push(ChatRequest::user(text, conversation_id));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::connection("No mock outcome queued")))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        assert!(!self.panics, "mock backend told to panic");
        self.record_and_pop(text, conversation_id)
    }

    fn endpoint(&self) -> &str {
        "mock://chat/"
    }
}

// ============================================================================
// Gated Backend (holds each reply until released)
// ============================================================================

/// Backend that blocks every call until `release` is called
pub struct GatedBackend {
    inner: MockBackend,
    gate: Notify,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Notify,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self {
            inner: MockBackend::new(),
            gate: Notify::new(),
            request_started: Notify::new(),
        }
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.inner.queue_reply(reply);
    }

    /// Let one waiting (or the next) call complete
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ChatBackend for GatedBackend {
    async fn send(&self, text: &str, conversation_id: &str) -> Result<ChatReply, ChatError> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .push(ChatRequest::user(text, conversation_id));
        self.request_started.notify_one();
        self.gate.notified().await;
        self.inner
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::connection("No mock outcome queued")))
    }

    fn endpoint(&self) -> &str {
        "mock://gated/chat/"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_replays_queue_in_order() {
        let mock = MockBackend::new();
        mock.queue_reply(ChatReply {
            text: "first".to_string(),
        });
        mock.queue_error(ChatError::http_status("HTTP 503"));

        assert_eq!(mock.send("a", "id").await.unwrap().text, "first");
        assert!(mock.send("b", "id").await.is_err());
        // Nothing queued: fails rather than hanging
        assert!(mock.send("c", "id").await.is_err());

        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].message, "c");
        assert_eq!(requests[2].role, "user");
    }
}
