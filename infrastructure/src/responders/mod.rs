//! Agent Response Service adapters.
//!
//! | Adapter | Backing |
//! |---------|---------|
//! | [`HttpAgentResponder`] | POSTs the conversation to an HTTP endpoint |
//! | [`ScriptedAgentResponder`] | Replays replies from a TOML script, for demos and rehearsals |

mod http;
mod scripted;

pub use http::HttpAgentResponder;
pub use scripted::{ScriptLoadError, ScriptedAgentResponder};
