//! Property-based tests for the state machine
//!
//! A small driver plays the controller's part (turn allocation, in-flight
//! bookkeeping, transcript length) and checks invariants after every step.

use super::*;
use crate::client::ChatError;
use crate::session::TurnTag;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Driver
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Submit(String),
    Reply,
    Fail,
    StaleReply,
    Reveal,
    Clear,
}

#[derive(Debug, Default)]
struct Driver {
    state: ChatState,
    generation: u64,
    next_seq: u64,
    in_flight: Vec<TurnTag>,
    scheduled: Vec<(TurnTag, Reveal)>,
    transcript_len: usize,
    dispatched: usize,
}

impl Driver {
    fn new() -> Self {
        Self {
            transcript_len: 1,
            ..Self::default()
        }
    }

    fn context(&self) -> ChatContext {
        ChatContext::new(
            format!("chat_{}_abcdefghi", self.generation),
            self.generation,
            Duration::from_millis(1000),
        )
    }

    fn event_for(&mut self, op: Op) -> Option<Event> {
        match op {
            Op::Submit(text) => {
                self.next_seq += 1;
                Some(Event::Submit {
                    text,
                    turn: TurnTag {
                        generation: self.generation,
                        seq: self.next_seq,
                    },
                })
            }
            Op::Reply => self.in_flight.first().map(|turn| Event::ReplyReceived {
                turn: *turn,
                text: "reply".to_string(),
            }),
            Op::Fail => self.in_flight.first().map(|turn| Event::RequestFailed {
                turn: *turn,
                error: ChatError::connection("refused"),
            }),
            Op::StaleReply => Some(Event::ReplyReceived {
                turn: TurnTag {
                    generation: self.generation.wrapping_add(7),
                    seq: 0,
                },
                text: "stale".to_string(),
            }),
            Op::Reveal => {
                if self.scheduled.is_empty() {
                    None
                } else {
                    let (turn, reveal) = self.scheduled.remove(0);
                    Some(Event::RevealElapsed { turn, reveal })
                }
            }
            Op::Clear => Some(Event::Clear),
        }
    }

    /// Apply effects the way the controller would, returning an error string
    /// when an invariant is broken.
    fn apply(&mut self, result: TransitionResult) -> Result<(), String> {
        self.state = result.new_state;
        for effect in result.effects {
            match effect {
                Effect::AppendMessage { message } => {
                    if message.text.is_empty() {
                        return Err("empty message appended".to_string());
                    }
                    self.transcript_len += 1;
                }
                Effect::ResetTranscript { .. } => self.transcript_len = 1,
                Effect::ResetSession => self.generation += 1,
                Effect::DispatchRequest { turn, .. } => {
                    self.dispatched += 1;
                    self.in_flight.push(turn);
                }
                Effect::AbortRequest => self.in_flight.clear(),
                Effect::ScheduleReveal { turn, reveal, .. } => {
                    self.in_flight.retain(|t| *t != turn);
                    self.scheduled.push((turn, reveal));
                }
                Effect::CancelReveals => self.scheduled.clear(),
                Effect::ClearInput | Effect::FocusInput => {}
            }
        }
        Ok(())
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,20}",
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_text().prop_map(Op::Submit),
        2 => Just(Op::Reply),
        1 => Just(Op::Fail),
        1 => Just(Op::StaleReply),
        2 => Just(Op::Reveal),
        1 => Just(Op::Clear),
    ]
}

fn arb_sending_turn() -> impl Strategy<Value = ChatState> {
    (0u64..5, 1u64..100).prop_map(|(generation, seq)| ChatState::Sending {
        turn: TurnTag { generation, seq },
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // At most one request is ever outstanding
    #[test]
    fn prop_single_request_in_flight(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut driver = Driver::new();

        for op in ops {
            let Some(event) = driver.event_for(op) else { continue };
            if let Ok(result) = transition(&driver.state, &driver.context(), event) {
                driver.apply(result).map_err(TestCaseError::fail)?;
            }
            prop_assert!(driver.in_flight.len() <= 1, "in flight: {:?}", driver.in_flight);
            prop_assert_eq!(driver.state.is_sending(), !driver.in_flight.is_empty());
        }
    }

    // The transcript only grows, except on Clear which resets it to one entry
    #[test]
    fn prop_transcript_append_only(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut driver = Driver::new();

        for op in ops {
            let is_clear = matches!(op, Op::Clear);
            let before = driver.transcript_len;
            let Some(event) = driver.event_for(op) else { continue };
            if let Ok(result) = transition(&driver.state, &driver.context(), event) {
                driver.apply(result).map_err(TestCaseError::fail)?;
            }
            if is_clear {
                prop_assert_eq!(driver.transcript_len, 1);
            } else {
                prop_assert!(driver.transcript_len >= before);
            }
        }
    }

    // Every accepted submit appends exactly one message and dispatches once
    #[test]
    fn prop_submit_appends_once(text in "[a-zA-Z]{1,10}[a-zA-Z ]{0,10}") {
        let mut driver = Driver::new();
        let event = driver.event_for(Op::Submit(text)).unwrap();
        let result = transition(&driver.state, &driver.context(), event).unwrap();
        driver.apply(result).map_err(TestCaseError::fail)?;

        prop_assert_eq!(driver.transcript_len, 2);
        prop_assert_eq!(driver.dispatched, 1);
    }

    // Busy conversations refuse submissions without producing effects
    #[test]
    fn prop_sending_rejects_submit(state in arb_sending_turn(), text in "[a-z]{1,10}") {
        let event = Event::Submit { text, turn: TurnTag { generation: 0, seq: 1000 } };
        let result = transition(&state, &ChatContext::new("id", 0, Duration::ZERO), event);
        prop_assert_eq!(result.err(), Some(TransitionError::Busy));
    }

    // Clear always lands in Idle with a fresh session, whatever came before
    #[test]
    fn prop_clear_always_resets(ops in proptest::collection::vec(arb_op(), 0..20)) {
        let mut driver = Driver::new();
        for op in ops {
            let Some(event) = driver.event_for(op) else { continue };
            if let Ok(result) = transition(&driver.state, &driver.context(), event) {
                driver.apply(result).map_err(TestCaseError::fail)?;
            }
        }

        let generation = driver.generation;
        let result = transition(&driver.state, &driver.context(), Event::Clear).unwrap();
        driver.apply(result).map_err(TestCaseError::fail)?;

        prop_assert_eq!(driver.state, ChatState::Idle);
        prop_assert_eq!(driver.generation, generation + 1);
        prop_assert_eq!(driver.transcript_len, 1);
        prop_assert!(driver.in_flight.is_empty());
        prop_assert!(driver.scheduled.is_empty());
    }
}
