//! Arena team rosters.
//!
//! Agents are assigned by clicking: the first four go to Alpha, the next four
//! to Omega. Clicking an assigned agent removes it from its team. The rosters
//! are disjoint by construction.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum roster size per team
pub const TEAM_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Alpha,
    Omega,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Alpha => write!(f, "Alpha"),
            Team::Omega => write!(f, "Omega"),
        }
    }
}

/// Result of a click-assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Joined(Team),
    Removed(Team),
    /// Both rosters are at capacity; nothing changed
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaTeams {
    alpha: Vec<AgentId>,
    omega: Vec<AgentId>,
}

impl ArenaTeams {
    /// Click-assign `agent`: remove it if already on a team, otherwise add it
    /// to the first team with room.
    pub fn assign(&mut self, agent: AgentId) -> Assignment {
        if let Some(pos) = self.alpha.iter().position(|a| a == &agent) {
            self.alpha.remove(pos);
            return Assignment::Removed(Team::Alpha);
        }
        if let Some(pos) = self.omega.iter().position(|a| a == &agent) {
            self.omega.remove(pos);
            return Assignment::Removed(Team::Omega);
        }

        if self.alpha.len() < TEAM_CAPACITY {
            self.alpha.push(agent);
            Assignment::Joined(Team::Alpha)
        } else if self.omega.len() < TEAM_CAPACITY {
            self.omega.push(agent);
            Assignment::Joined(Team::Omega)
        } else {
            Assignment::Full
        }
    }

    pub fn team_of(&self, agent: &AgentId) -> Option<Team> {
        if self.alpha.contains(agent) {
            Some(Team::Alpha)
        } else if self.omega.contains(agent) {
            Some(Team::Omega)
        } else {
            None
        }
    }

    pub fn contains(&self, agent: &AgentId) -> bool {
        self.team_of(agent).is_some()
    }

    pub fn alpha(&self) -> &[AgentId] {
        &self.alpha
    }

    pub fn omega(&self) -> &[AgentId] {
        &self.omega
    }

    /// Name of the first empty team, if any.
    pub fn empty_team(&self) -> Option<Team> {
        if self.alpha.is_empty() {
            Some(Team::Alpha)
        } else if self.omega.is_empty() {
            Some(Team::Omega)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.alpha.clear();
        self.omega.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty() && self.omega.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> AgentId {
        AgentId::new(format!("agent-{}", n))
    }

    #[test]
    fn test_first_four_alpha_next_four_omega() {
        let mut teams = ArenaTeams::default();
        for n in 0..4 {
            assert_eq!(teams.assign(id(n)), Assignment::Joined(Team::Alpha));
        }
        for n in 4..8 {
            assert_eq!(teams.assign(id(n)), Assignment::Joined(Team::Omega));
        }
        assert_eq!(teams.assign(id(8)), Assignment::Full);
        assert_eq!(teams.alpha().len(), TEAM_CAPACITY);
        assert_eq!(teams.omega().len(), TEAM_CAPACITY);
        assert!(!teams.contains(&id(8)));
    }

    #[test]
    fn test_reclick_removes() {
        let mut teams = ArenaTeams::default();
        teams.assign(id(0));
        assert_eq!(teams.assign(id(0)), Assignment::Removed(Team::Alpha));
        assert!(teams.is_empty());
    }

    #[test]
    fn test_freed_alpha_slot_is_refilled_first() {
        let mut teams = ArenaTeams::default();
        for n in 0..5 {
            teams.assign(id(n));
        }
        assert_eq!(teams.team_of(&id(4)), Some(Team::Omega));

        teams.assign(id(1));
        assert_eq!(teams.assign(id(9)), Assignment::Joined(Team::Alpha));
    }

    #[test]
    fn test_empty_team() {
        let mut teams = ArenaTeams::default();
        assert_eq!(teams.empty_team(), Some(Team::Alpha));
        for n in 0..4 {
            teams.assign(id(n));
        }
        assert_eq!(teams.empty_team(), Some(Team::Omega));
        teams.assign(id(4));
        assert_eq!(teams.empty_team(), None);
    }
}
