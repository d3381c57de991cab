//! Chat backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Connection, message)
    }

    pub fn http_status(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::HttpStatus, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::MalformedResponse, message)
    }
}

/// Failure classification. Only used for logging: every kind is shown to the
/// user as the same fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Transport unreachable, refused, or timed out
    Connection,
    /// Non-2xx response, whatever the body
    HttpStatus,
    /// 2xx response without a usable `response` field
    MalformedResponse,
}

impl ChatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::HttpStatus => "http_status",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl std::fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
