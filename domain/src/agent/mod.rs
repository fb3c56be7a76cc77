//! Agent domain - identities and the active agent registry.

pub mod registry;
pub mod value_objects;

pub use registry::{AgentProfile, AgentRegistry, RING_POSITIONS};
pub use value_objects::{AgentId, Speaker};
