//! Agent Response Service port
//!
//! Produces an agent's reply text for the current conversation. The controller
//! never retries a failed call: a failure pauses the session or drops the
//! speaker from the Free Floor.

use async_trait::async_trait;
use council_domain::{AgentProfile, CouncilError, CouncilMode, Message};
use thiserror::Error;

/// Errors that can occur while generating a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No scripted reply left for {0}")]
    Exhausted(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<ResponderError> for CouncilError {
    fn from(err: ResponderError) -> Self {
        CouncilError::transient(err.to_string())
    }
}

/// What an agent is shown when asked to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub council_id: String,
    pub topic: String,
    pub mode: CouncilMode,
    /// Session round of this turn, if a Chamber/Arena session is running
    pub round: Option<u32>,
    /// The canonical message log, in append order
    pub messages: Vec<Message>,
}

/// Generates agent replies
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait AgentResponder: Send + Sync {
    async fn generate(
        &self,
        agent: &AgentProfile,
        context: &ConversationContext,
    ) -> Result<String, ResponderError>;
}
