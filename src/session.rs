//! Conversation identity
//!
//! A session is identified by an opaque id that correlates turns with the
//! backend. Every reset issues a fresh id and bumps the generation, so work
//! tagged with an older generation can be recognised and dropped.

use chrono::Utc;
use rand::Rng;

const ID_PREFIX: &str = "chat";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Tag carried by every in-flight request and scheduled reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnTag {
    pub generation: u64,
    pub seq: u64,
}

/// Owns the conversation id and its generation counter
#[derive(Debug)]
pub struct SessionManager {
    id: String,
    generation: u64,
    next_seq: u64,
    last_millis: i64,
}

impl SessionManager {
    pub fn new() -> Self {
        let mut manager = Self {
            id: String::new(),
            generation: 0,
            next_seq: 0,
            last_millis: 0,
        };
        manager.id = manager.new_id();
        manager
    }

    /// Produce a fresh id: `chat_<unix millis>_<random base-36 suffix>`.
    ///
    /// The time component never goes backwards for a given manager even if
    /// the wall clock does. Collisions are unlikely, not impossible; the id is
    /// a correlation token, not a key.
    pub fn new_id(&mut self) -> String {
        let millis = Utc::now().timestamp_millis().max(self.last_millis);
        self.last_millis = millis;

        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();

        format!("{ID_PREFIX}_{millis}_{suffix}")
    }

    /// Replace the id and start a new generation
    pub fn reset(&mut self) -> &str {
        let previous = std::mem::take(&mut self.id);
        let mut next = self.new_id();
        // Same millisecond and an identical suffix is astronomically rare,
        // but a reset must always change the id.
        while next == previous {
            next = self.new_id();
        }
        self.id = next;
        self.generation += 1;
        tracing::info!(
            conversation_id = %self.id,
            generation = self.generation,
            "Session reset"
        );
        &self.id
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Allocate a tag for a new turn in the live generation
    pub fn next_turn(&mut self) -> TurnTag {
        self.next_seq += 1;
        TurnTag {
            generation: self.generation,
            seq: self.next_seq,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
