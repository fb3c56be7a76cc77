//! Scripted agent responder.
//!
//! The script is a TOML table mapping agent ids to the replies that agent
//! gives, in order:
//!
//! ```toml
//! wisdom = ["Let us begin. [NEXT: Aster]", "[CONCLUDE]"]
//! aster = ["I see three options. [NEXT: wisdom]"]
//! ```
//!
//! Each call consumes one reply. An agent with no replies left fails with
//! [`ResponderError::Exhausted`].

use async_trait::async_trait;
use council_application::ports::agent_responder::{
    AgentResponder, ConversationContext, ResponderError,
};
use council_domain::AgentProfile;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScriptLoadError {
    #[error("could not read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default)]
pub struct ScriptedAgentResponder {
    replies: Mutex<HashMap<String, VecDeque<String>>>,
}

impl ScriptedAgentResponder {
    pub fn new(replies: HashMap<String, Vec<String>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|(agent, lines)| (agent, VecDeque::from(lines)))
            .collect();
        Self {
            replies: Mutex::new(replies),
        }
    }

    pub fn from_toml_str(script: &str) -> Result<Self, ScriptLoadError> {
        let replies: HashMap<String, Vec<String>> = toml::from_str(script)?;
        Ok(Self::new(replies))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptLoadError> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path).map_err(|source| ScriptLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&script)
    }

    /// Replies still queued for `agent_id`.
    pub fn remaining(&self, agent_id: &str) -> usize {
        self.replies
            .lock()
            .map(|r| r.get(agent_id).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl AgentResponder for ScriptedAgentResponder {
    async fn generate(
        &self,
        agent: &AgentProfile,
        _context: &ConversationContext,
    ) -> Result<String, ResponderError> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| ResponderError::Other("script state poisoned".to_string()))?;

        let reply = replies
            .get_mut(agent.id.as_str())
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| ResponderError::Exhausted(agent.id.to_string()))?;

        debug!(agent = %agent.id, "Scripted reply");
        Ok(reply)
    }
}
