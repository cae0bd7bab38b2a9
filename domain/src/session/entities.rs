//! Session value objects

use serde::{Deserialize, Serialize};

/// Opaque conversation identifier (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How a session's round sequences are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Every responder replies exactly once per trigger, in roster order
    SingleResponder,
    /// Decaying-participation rounds
    #[default]
    MultiResponder,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::SingleResponder => "single",
            SessionMode::MultiResponder => "multi",
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "single_responder" | "solo" => Ok(SessionMode::SingleResponder),
            "multi" | "multi_responder" | "group" => Ok(SessionMode::MultiResponder),
            other => Err(format!("unknown session mode: {other}")),
        }
    }
}

/// A reply waiting to be drained by a poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub identity: String,
    pub content: String,
}

impl Reply {
    pub fn new(identity: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            content: content.into(),
        }
    }
}

/// Requested roster for a new session
///
/// `members` are persona names or aliases. An empty list means the whole
/// catalog. When `mode` is `None` it is derived from the resolved roster size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSpec {
    pub members: Vec<String>,
    pub mode: Option<SessionMode>,
}

impl RosterSpec {
    /// Every persona in the catalog
    pub fn everyone() -> Self {
        Self::default()
    }

    pub fn of<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = Some(mode);
        self
    }
}
