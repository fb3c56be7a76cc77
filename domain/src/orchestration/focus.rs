//! Focus mode selection set.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Agents currently in focus. A pure toggle set; nothing is invoked automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSelection {
    selected: Vec<AgentId>,
}

impl FocusSelection {
    /// Toggle `agent`. Returns `true` if the agent is now selected.
    pub fn toggle(&mut self, agent: AgentId) -> bool {
        if let Some(pos) = self.selected.iter().position(|a| a == &agent) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(agent);
            true
        }
    }

    pub fn contains(&self, agent: &AgentId) -> bool {
        self.selected.contains(agent)
    }

    pub fn selected(&self) -> &[AgentId] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
