//! Infrastructure layer for council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod responders;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig, FileCouncilConfig,
    FileLoggingConfig, FileResponderConfig, FileStorageConfig, FileTimingConfig, ResponderKind,
    StorageKind,
};
pub use logging::JsonlConversationLogger;
pub use responders::{HttpAgentResponder, ScriptLoadError, ScriptedAgentResponder};
pub use storage::{JsonFileConversationStore, MemoryConversationStore};
