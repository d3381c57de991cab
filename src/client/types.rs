//! Wire types for the chat endpoint

use serde::{Deserialize, Serialize};

/// Body of `POST /chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
    pub role: String,
}

impl ChatRequest {
    pub fn user(message: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: conversation_id.into(),
            role: "user".to_string(),
        }
    }
}

/// Successful reply body. The server also echoes `conversation_id`; it is
/// not needed here.
#[derive(Debug, Deserialize)]
pub(super) struct ChatResponseBody {
    pub response: String,
}

/// Reply text extracted from a successful exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}
