//! Append-only chat history for one interactive session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::config::DEFAULT_GREETING;
use crate::types::ModelMessage;

/// Who spoke a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The model-facing form of this turn.
    pub fn to_message(&self) -> ModelMessage {
        match self.role {
            Role::User => ModelMessage::user(self.content.clone()),
            Role::Assistant => ModelMessage::assistant(self.content.clone()),
        }
    }
}

/// Ordered turn history, seeded with one assistant greeting.
///
/// The only mutation is [`Session::append`]; existing turns are never
/// removed, edited or reordered, so any earlier `history()` snapshot is a
/// prefix of every later one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    turns: Vec<Turn>,
}

impl Default for Session {
    fn default() -> Self {
        Self::init()
    }
}

impl Session {
    /// New session greeted with the default greeting.
    pub fn init() -> Self {
        Self::new(DEFAULT_GREETING)
    }

    /// New session greeted with `greeting`.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: vec![Turn::assistant(greeting)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: a session starts with its greeting.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_seeds_one_assistant_greeting() {
        let session = Session::init();
        assert_eq!(session.len(), 1);
        let greeting = &session.history()[0];
        assert_eq!(greeting.role(), Role::Assistant);
        assert_eq!(greeting.content(), DEFAULT_GREETING);
    }

    #[test]
    fn completed_exchanges_grow_history_by_two() {
        let mut session = Session::new("hello");
        for n in 1..=3 {
            session.append(Turn::user(format!("question {n}")));
            session.append(Turn::assistant(format!("answer {n}")));
            assert_eq!(session.len(), 1 + 2 * n);
        }
    }

    #[test]
    fn earlier_snapshot_is_a_prefix() {
        let mut session = Session::new("hello");
        session.append(Turn::user("one"));
        let before = session.history().to_vec();

        session.append(Turn::assistant("two"));
        session.append(Turn::user("three"));

        assert_eq!(&session.history()[..before.len()], before.as_slice());
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = Session::new("hi");
        let b = Session::new("hi");
        a.append(Turn::user("only in a"));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
    }
}
