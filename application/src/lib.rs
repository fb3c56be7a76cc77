//! Application layer for council
//!
//! This crate contains the council controller actor, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, TimingParams};
pub use ports::{
    agent_responder::{AgentResponder, ConversationContext, ResponderError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    conversation_store::{ConversationStore, StoreError},
    council_event::{CouncilEvent, SessionEndReason},
};
pub use use_cases::council_controller::{
    CouncilController, CouncilHandle, CouncilSnapshot, SessionSnapshot,
};
