//! Transcript storage
//!
//! The transcript is an append-only sequence of immutable messages. Every
//! change produces a new version; readers holding an older snapshot keep a
//! consistent view without locking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const WELCOME_GREETING: &str = "👋 Hello! I'm your AI assistant. How can I help you today?";
pub const CLEARED_GREETING: &str = "👋 Chat cleared! How can I help you today?";
pub const FALLBACK_ERROR_TEXT: &str =
    "❌ Sorry, I encountered an error. Please check if the backend server is running and try again.";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    fn new(sender: Sender, text: &str, is_error: bool) -> Self {
        let text = text.trim();
        debug_assert!(!text.is_empty(), "messages must carry text");
        Self {
            sender,
            text: text.to_string(),
            timestamp: Utc::now(),
            is_error,
        }
    }

    pub fn user(text: &str) -> Self {
        Self::new(Sender::User, text, false)
    }

    pub fn ai(text: &str) -> Self {
        Self::new(Sender::Ai, text, false)
    }

    /// Synthesized entry shown in place of a reply that never arrived
    pub fn ai_error() -> Self {
        Self::new(Sender::Ai, FALLBACK_ERROR_TEXT, true)
    }

    pub fn welcome() -> Self {
        Self::ai(WELCOME_GREETING)
    }

    pub fn cleared() -> Self {
        Self::ai(CLEARED_GREETING)
    }
}

/// Immutable-per-version ordered message list
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Arc<[Message]>,
}

impl Transcript {
    /// A transcript holding only `seed`
    pub fn seeded(seed: Message) -> Self {
        Self {
            messages: Arc::from(vec![seed]),
        }
    }

    /// New version with `message` at the end; `self` is left untouched
    #[must_use]
    pub fn append(&self, message: Message) -> Self {
        let mut next = Vec::with_capacity(self.messages.len() + 1);
        next.extend_from_slice(&self.messages);
        next.push(message);
        Self {
            messages: Arc::from(next),
        }
    }

    /// New version containing only `seed`
    #[must_use]
    pub fn reset(&self, seed: Message) -> Self {
        Self::seeded(seed)
    }

    pub fn snapshot(&self) -> Arc<[Message]> {
        Arc::clone(&self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded(Message::welcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_greeting() {
        let transcript = Transcript::default();
        assert_eq!(transcript.len(), 1);
        let snapshot = transcript.snapshot();
        let greeting = snapshot.last().unwrap();
        assert_eq!(greeting.sender, Sender::Ai);
        assert!(!greeting.is_error);
    }

    #[test]
    fn test_append_leaves_previous_version_intact() {
        let v1 = Transcript::default();
        let before = v1.snapshot();

        let v2 = v1.append(Message::user("hello"));

        assert_eq!(v1.len(), 1);
        assert_eq!(v2.len(), 2);
        assert_eq!(before.len(), 1);
        assert_eq!(v2.snapshot()[0], before[0]);
        assert_eq!(v2.snapshot()[1].text, "hello");
    }

    #[test]
    fn test_append_preserves_order() {
        let transcript = Transcript::default()
            .append(Message::user("one"))
            .append(Message::ai("two"))
            .append(Message::user("three"));

        let snapshot = transcript.snapshot();
        let texts: Vec<&str> = snapshot.iter().skip(1).map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_reset_shrinks_to_seed() {
        let transcript = Transcript::default()
            .append(Message::user("a"))
            .append(Message::ai("b"));

        let reset = transcript.reset(Message::cleared());

        assert_eq!(reset.len(), 1);
        assert_eq!(reset.snapshot()[0].text, CLEARED_GREETING);
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn test_text_is_trimmed() {
        let message = Message::user("  spaced out \n");
        assert_eq!(message.text, "spaced out");
    }

    #[test]
    fn test_error_message_is_flagged() {
        let message = Message::ai_error();
        assert!(message.is_error);
        assert_eq!(message.sender, Sender::Ai);
        assert_eq!(message.text, FALLBACK_ERROR_TEXT);
    }

    #[test]
    fn test_serializes_sender_snake_case() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["is_error"], false);
    }
}
