//! Chat state types

use crate::session::TurnTag;
use std::time::Duration;

/// Default pause between a reply arriving and it being shown
pub const DEFAULT_SMOOTHING_DELAY: Duration = Duration::from_millis(1000);

/// Controller state. `Sending` is the mutual-exclusion guard: at most one
/// request is outstanding per conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Ready for input, no request outstanding
    #[default]
    Idle,

    /// One request in flight for `turn`
    Sending { turn: TurnTag },
}

impl ChatState {
    pub fn is_sending(&self) -> bool {
        self.in_flight().is_some()
    }

    /// Tag of the request currently in flight, if any
    pub fn in_flight(&self) -> Option<TurnTag> {
        match self {
            ChatState::Sending { turn } => Some(*turn),
            ChatState::Idle => None,
        }
    }
}

/// Live session facts a transition may read. Rebuilt by the controller
/// before every transition so it always reflects the current session.
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub conversation_id: String,
    pub generation: u64,
    pub smoothing_delay: Duration,
}

impl ChatContext {
    pub fn new(conversation_id: impl Into<String>, generation: u64, smoothing_delay: Duration) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            generation,
            smoothing_delay,
        }
    }
}
