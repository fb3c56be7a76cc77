//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_responder;
pub mod conversation_logger;
pub mod conversation_store;
pub mod council_event;
