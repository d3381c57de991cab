//! Chat turn state machine
//!
//! Pure transitions in the Elm style: `(state, context, event)` in,
//! `(new state, effects)` out. All I/O lives in the controller.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reveal};
pub use event::Event;
pub use state::{ChatContext, ChatState};
pub use transition::{transition, TransitionError, TransitionResult};
