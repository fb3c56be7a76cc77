//! Active agent registry.
//!
//! The registry is the single source of truth for which agents take part in a
//! council. Handoff targets, votes, raised hands and team assignments are all
//! checked against it.

use super::value_objects::AgentId;
use crate::core::error::CouncilError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of positions on the resonance ring.
pub const RING_POSITIONS: u8 = 8;

/// A council persona as seen by the orchestration engine.
///
/// Persona content (prompts, avatars) lives elsewhere; the engine only needs
/// identity, display name and the temporal resonance parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    /// Display name used in transcripts and `[NEXT: <name>]` directives
    pub name: String,
    /// Fixed position on the resonance ring (1..=8)
    pub position: u8,
    /// Frequency multiplier relative to the global phase
    pub frequency: f64,
    /// Voice reference handed to the presentation layer on release
    pub voice: Option<String>,
}

impl AgentProfile {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, position: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            frequency: 1.0,
            voice: None,
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Whether `reference` names this agent by id or display name (case-insensitive).
    pub fn matches(&self, reference: &str) -> bool {
        let reference = reference.trim().to_lowercase();
        self.id.as_str().to_lowercase() == reference || self.name.to_lowercase() == reference
    }
}

/// The set of active agents plus the terminator role.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentProfile>,
    terminator: Option<AgentId>,
}

impl AgentRegistry {
    /// Build a registry, validating ids, ring positions and the terminator.
    pub fn new(
        agents: Vec<AgentProfile>,
        terminator: Option<AgentId>,
    ) -> Result<Self, CouncilError> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if agent.id.as_str().trim().is_empty() {
                return Err(CouncilError::validation("agent id cannot be empty"));
            }
            if !seen.insert(agent.id.clone()) {
                return Err(CouncilError::validation(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
            if !(1..=RING_POSITIONS).contains(&agent.position) {
                return Err(CouncilError::validation(format!(
                    "agent {} has position {} outside 1..={}",
                    agent.id, agent.position, RING_POSITIONS
                )));
            }
            if !(agent.frequency.is_finite() && agent.frequency > 0.0) {
                return Err(CouncilError::validation(format!(
                    "agent {} has a non-positive frequency",
                    agent.id
                )));
            }
        }

        if let Some(ref id) = terminator
            && !seen.contains(id)
        {
            return Err(CouncilError::validation(format!(
                "terminator {} is not an active agent",
                id
            )));
        }

        Ok(Self { agents, terminator })
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve a free-form reference (id or display name) to an active agent.
    pub fn resolve(&self, reference: &str) -> Option<&AgentProfile> {
        if reference.trim().is_empty() {
            return None;
        }
        // Exact id match wins over a display-name match
        self.agents
            .iter()
            .find(|a| a.id.as_str().eq_ignore_ascii_case(reference.trim()))
            .or_else(|| self.agents.iter().find(|a| a.matches(reference)))
    }

    /// Look up an agent or fail with `NotFound`.
    pub fn require(&self, id: &AgentId) -> Result<&AgentProfile, CouncilError> {
        self.get(id)
            .ok_or_else(|| CouncilError::not_found(format!("{} is not an active agent", id)))
    }

    pub fn terminator(&self) -> Option<&AgentId> {
        self.terminator.as_ref()
    }

    pub fn is_terminator(&self, id: &AgentId) -> bool {
        self.terminator.as_ref() == Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentProfile> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
