//! Transcript domain entities

use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Conversation framing written when the session is created
    System,
    /// The external participant whose message triggered a round sequence
    External,
    /// A roster member, identified by its persona identity
    Responder(String),
}

impl Origin {
    /// Identity of the responder, if this entry came from one
    pub fn responder(&self) -> Option<&str> {
        match self {
            Origin::Responder(identity) => Some(identity),
            _ => None,
        }
    }
}

/// A single line of dialogue (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub origin: Origin,
    pub content: String,
}

impl Entry {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            origin: Origin::System,
            content: content.into(),
        }
    }

    pub fn external(content: impl Into<String>) -> Self {
        Self {
            origin: Origin::External,
            content: content.into(),
        }
    }

    pub fn responder(identity: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: Origin::Responder(identity.into()),
            content: content.into(),
        }
    }
}

/// Ordered, append-only dialogue log shared by every responder of a session.
///
/// The entries are the literal context handed to the backend on every turn,
/// so insertion order matters. There is intentionally no way to edit or
/// remove an entry once appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transcript with an opening system entry
    pub fn with_opening(content: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.append(Entry::system(content));
        transcript
    }

    pub fn append(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Entries written by responders, in order
    pub fn responder_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.origin, Origin::Responder(_)))
    }
}
