//! Conversation domain - the shared council record.

pub mod entities;

pub use entities::{Commitment, ConversationRecord, Message};
