//! Structured transcript logging.
//!
//! Provides [`JsonlConversationLogger`], which implements the
//! [`ConversationLogger`](council_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
