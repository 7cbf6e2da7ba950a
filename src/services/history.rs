//! History adapter — client chat turns → provider-ready conversation.
//!
//! DESIGN
//! ======
//! Clients send whatever history they kept, in their own role vocabulary.
//! Stateful chat APIs want non-empty turns, roles `user`/`model`, and a
//! first turn from the user. `normalize` is the only way to build a
//! `NormalizedHistory`, so holding one means those rules hold.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role as sent by the client. Anything other than `assistant` is user-origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    #[default]
    User,
    Assistant,
    Other,
}

impl ChatRole {
    /// Missing, `null`, and non-string roles are user-origin.
    #[must_use]
    pub fn from_wire(raw: Option<&Value>) -> Self {
        match raw {
            Some(Value::String(s)) if s == "assistant" => Self::Assistant,
            Some(Value::String(s)) if s != "user" => Self::Other,
            _ => Self::User,
        }
    }
}

/// One turn of client-supplied history. Decoding never fails: entries
/// that are not objects, or whose `content` is neither a string nor a
/// number, come out with `content: None` and are dropped by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: Option<String>,
}

impl From<Value> for ChatTurn {
    fn from(raw: Value) -> Self {
        let Value::Object(obj) = raw else {
            return Self::default();
        };
        let content = match obj.get("content") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self { role: ChatRole::from_wire(obj.get("role")), content }
    }
}

/// Role as understood by the completion gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Turns with non-empty text whose first element, if any, is from the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedHistory {
    turns: Vec<Turn>,
}

impl NormalizedHistory {
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

/// Drop empty turns, map roles, then trim leading model turns. Pure.
#[must_use]
pub fn normalize(turns: &[ChatTurn]) -> NormalizedHistory {
    let mapped = turns.iter().filter_map(|turn| {
        let text = turn.content.as_deref().filter(|c| !c.is_empty())?;
        let role = match turn.role {
            ChatRole::Assistant => Role::Model,
            ChatRole::User | ChatRole::Other => Role::User,
        };
        Some(Turn { role, text: text.to_owned() })
    });

    let turns = mapped
        .skip_while(|turn| turn.role != Role::User)
        .collect();

    NormalizedHistory { turns }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
