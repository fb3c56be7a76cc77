//! Agent value objects - identifiers and speaker attribution.
//!
//! - [`AgentId`] - Stable identifier of a council persona
//! - [`Speaker`] - Who authored a message or opened a vote (operator or agent)

use serde::{Deserialize, Serialize};

/// Unique identifier for a council agent.
///
/// Agent ids are configured up front (e.g. `"wisdom"`, `"skeptic"`) and stay
/// stable for the lifetime of the council.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a council action: the human operator or one of the agents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Speaker {
    Operator,
    Agent(AgentId),
}

impl Speaker {
    /// The agent id, if this speaker is an agent.
    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            Speaker::Operator => None,
            Speaker::Agent(id) => Some(id),
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Speaker::Operator)
    }
}

impl From<AgentId> for Speaker {
    fn from(id: AgentId) -> Self {
        Speaker::Agent(id)
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Operator => write!(f, "operator"),
            Speaker::Agent(id) => write!(f, "{}", id),
        }
    }
}
