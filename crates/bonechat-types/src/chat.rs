//! Conversation types: turns, the turn log, and the typed session view.
//!
//! A [`Turn`] is what gets stored in the session bag. Stored data is treated
//! as untrusted on the way back in: an unrecognized or non-string role
//! deserializes to [`Role::Unknown`] and a missing or non-string `content` to
//! the empty string, and log entries that are not objects at all are dropped
//! one by one, so a malformed entry never fails the whole log. Filtering the
//! surviving odd entries out is the job of the history adapter in
//! `bonechat-core`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Default number of user/model pairs retained per session.
pub const DEFAULT_MAX_TURNS: usize = 12;

/// Session key under which the turn log is stored.
pub const CHAT_HISTORY_KEY: &str = "chat_history";

/// Speaker of a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    /// Anything that was stored with a role other than `user` or `model`.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Whether this role may be sent to the generation service.
    pub fn is_conversational(&self) -> bool {
        matches!(self, Role::User | Role::Model)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One message in the conversation, tagged with its speaker.
///
/// Fields are private: a turn is never modified after it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default, deserialize_with = "lenient_role")]
    role: Role,
    #[serde(default, deserialize_with = "lenient_content")]
    content: String,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().unwrap_or(Role::Unknown),
        _ => Role::Unknown,
    })
}

fn lenient_content<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(Role::Model, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered turns of one session, oldest first.
pub type TurnLog = Vec<Turn>;

/// Typed view over the session bag.
///
/// The session itself is an untyped key-value store; this is the only shape
/// the chat code reads from or writes into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub turn_log: TurnLog,
}

impl SessionState {
    /// Build the state from the raw value stored under [`CHAT_HISTORY_KEY`].
    ///
    /// Absent values yield an empty log. Entries that are not turn-shaped
    /// objects are skipped; a value that is not a list at all is returned as
    /// the decode error.
    pub fn from_stored(value: Option<Value>) -> Result<Self, serde_json::Error> {
        let entries: Vec<Value> = match value {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(value) => serde_json::from_value(value)?,
        };
        let turn_log = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        Ok(Self { turn_log })
    }

    /// Raw value to store under [`CHAT_HISTORY_KEY`].
    pub fn to_stored(&self) -> Value {
        serde_json::to_value(&self.turn_log).unwrap_or_else(|_| Value::Array(Vec::new()))
    }
}
