//! Events that drive the chat state machine

use super::effect::Reveal;
use crate::client::ChatError;
use crate::session::TurnTag;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
        /// Tag allocated for this turn by the session
        turn: TurnTag,
    },
    Clear,

    // Backend events
    ReplyReceived {
        turn: TurnTag,
        text: String,
    },
    RequestFailed {
        turn: TurnTag,
        error: ChatError,
    },

    // Timer events
    RevealElapsed {
        turn: TurnTag,
        reveal: Reveal,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::Clear => "clear",
            Event::ReplyReceived { .. } => "reply_received",
            Event::RequestFailed { .. } => "request_failed",
            Event::RevealElapsed { .. } => "reveal_elapsed",
        }
    }
}
