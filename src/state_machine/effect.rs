//! Effects produced by state transitions

use crate::session::TurnTag;
use crate::transcript::Message;
use std::time::Duration;

/// What a scheduled reveal will append once its delay elapses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    Reply(String),
    Failure,
}

impl Reveal {
    pub fn into_message(self) -> Message {
        match self {
            Reveal::Reply(text) => Message::ai(&text),
            Reveal::Failure => Message::ai_error(),
        }
    }
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Commit a new transcript version with `message` appended
    AppendMessage { message: Message },

    /// Replace the transcript with a single seed message
    ResetTranscript { seed: Message },

    /// Issue a new conversation id and generation
    ResetSession,

    /// Empty the input field
    ClearInput,

    /// Return focus to the input field
    FocusInput,

    /// Send the turn to the backend (spawned, cancellable)
    DispatchRequest {
        turn: TurnTag,
        text: String,
        /// Captured at submit time, never re-read
        conversation_id: String,
    },

    /// Cancel the request in flight
    AbortRequest,

    /// Start the smoothing timer for a resolved turn
    ScheduleReveal {
        turn: TurnTag,
        reveal: Reveal,
        delay: Duration,
    },

    /// Cancel every scheduled reveal
    CancelReveals,
}

impl Effect {
    pub fn append_user(text: &str) -> Self {
        Effect::AppendMessage {
            message: Message::user(text),
        }
    }

    pub fn append_reveal(reveal: Reveal) -> Self {
        Effect::AppendMessage {
            message: reveal.into_message(),
        }
    }

    pub fn reset_transcript() -> Self {
        Effect::ResetTranscript {
            seed: Message::cleared(),
        }
    }
}
