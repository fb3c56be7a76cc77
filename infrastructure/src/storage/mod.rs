//! Conversation store adapters.
//!
//! - [`MemoryConversationStore`] keeps records in process; nothing survives a restart.
//! - [`JsonFileConversationStore`] writes one pretty-printed JSON file per council.

mod json_file;
mod memory;

pub use json_file::JsonFileConversationStore;
pub use memory::MemoryConversationStore;
