//! Pure state transition function
//!
//! Given the same state, context and event this always yields the same new
//! state and effects, and performs no I/O.

use super::{ChatContext, ChatState, Effect, Event, Reveal};
use crate::session::TurnTag;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is refused. None of these reach the user as an error
/// message; the controller drops the event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is still pending")]
    Busy,
    #[error("Result belongs to a turn that is no longer current")]
    StaleTurn,
}

pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        (_, Event::Submit { text, .. }) if text.trim().is_empty() => Err(TransitionError::EmptyInput),

        // Dropped, never queued
        (ChatState::Sending { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        // Idle + Submit -> Sending. The user message is committed in the same
        // step that dispatches, so it never waits on the network.
        (ChatState::Idle, Event::Submit { text, turn }) => {
            let text = text.trim().to_string();
            Ok(TransitionResult::new(ChatState::Sending { turn })
                .with_effect(Effect::append_user(&text))
                .with_effect(Effect::ClearInput)
                .with_effect(Effect::DispatchRequest {
                    turn,
                    text,
                    conversation_id: context.conversation_id.clone(),
                }))
        }

        // ============================================================
        // Request resolution
        // ============================================================

        // A blank reply can't become a message; it shows as a failure
        (ChatState::Sending { turn: in_flight }, Event::ReplyReceived { turn, text })
            if *in_flight == turn =>
        {
            let reveal = if text.trim().is_empty() {
                Reveal::Failure
            } else {
                Reveal::Reply(text)
            };
            Ok(resolve(context, turn, reveal))
        }

        (ChatState::Sending { turn: in_flight }, Event::RequestFailed { turn, .. })
            if *in_flight == turn =>
        {
            Ok(resolve(context, turn, Reveal::Failure))
        }

        (_, Event::ReplyReceived { .. } | Event::RequestFailed { .. }) => {
            Err(TransitionError::StaleTurn)
        }

        // ============================================================
        // Smoothing delay elapsed
        // ============================================================

        // Does not touch the state: a later turn may already be in flight.
        (state, Event::RevealElapsed { turn, reveal }) => {
            if turn.generation == context.generation {
                Ok(TransitionResult::new(*state).with_effect(Effect::append_reveal(reveal)))
            } else {
                Err(TransitionError::StaleTurn)
            }
        }

        // ============================================================
        // Reset
        // ============================================================

        (state, Event::Clear) => {
            let abort = state.is_sending().then_some(Effect::AbortRequest);
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effects(abort)
                .with_effect(Effect::CancelReveals)
                .with_effect(Effect::ResetSession)
                .with_effect(Effect::reset_transcript())
                .with_effect(Effect::FocusInput))
        }
    }
}

/// Both outcomes end the same way: back to Idle, reveal after the delay,
/// focus restored.
fn resolve(context: &ChatContext, turn: TurnTag, reveal: Reveal) -> TransitionResult {
    TransitionResult::new(ChatState::Idle)
        .with_effect(Effect::ScheduleReveal {
            turn,
            reveal,
            delay: context.smoothing_delay,
        })
        .with_effect(Effect::FocusInput)
}
