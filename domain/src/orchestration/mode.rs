//! Council mode definitions.
//!
//! Defines [`CouncilMode`], the single top-level interaction mode of a council.
//! Exactly one mode is active at a time:
//!
//! - Off: free conversation, Free Floor available
//! - Chamber: scripted sequential handoff
//! - Arena: Chamber restricted to two team rosters
//! - Focus: a selection set of agents, no automated turns
//! - Crucible / Workshop: board-backed modes, Free Floor available

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared board a mode reads from when it becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardKind {
    /// LaTeX proof/derivation board
    Latex,
    /// Code board
    Code,
}

/// Top-level interaction mode of a council.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilMode {
    #[default]
    Off,
    Chamber,
    Arena,
    Focus,
    Crucible,
    Workshop,
}

impl CouncilMode {
    pub const ALL: [CouncilMode; 6] = [
        CouncilMode::Off,
        CouncilMode::Chamber,
        CouncilMode::Arena,
        CouncilMode::Focus,
        CouncilMode::Crucible,
        CouncilMode::Workshop,
    ];

    /// Modes driven by the turn scheduler
    pub fn is_scripted(&self) -> bool {
        matches!(self, CouncilMode::Chamber | CouncilMode::Arena)
    }

    /// Modes in which the Free Floor queue may run
    pub fn allows_free_floor(&self) -> bool {
        matches!(
            self,
            CouncilMode::Off | CouncilMode::Crucible | CouncilMode::Workshop
        )
    }

    /// Board primed when this mode becomes active
    pub fn board(&self) -> Option<BoardKind> {
        match self {
            CouncilMode::Crucible => Some(BoardKind::Latex),
            CouncilMode::Workshop => Some(BoardKind::Code),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilMode::Off => "off",
            CouncilMode::Chamber => "chamber",
            CouncilMode::Arena => "arena",
            CouncilMode::Focus => "focus",
            CouncilMode::Crucible => "crucible",
            CouncilMode::Workshop => "workshop",
        }
    }

    /// Get a human-readable description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            CouncilMode::Off => "Open conversation, hands may be raised for the Free Floor",
            CouncilMode::Chamber => "Scripted turns handed off with [NEXT: ...] directives",
            CouncilMode::Arena => "Chamber turns restricted to the Alpha and Omega teams",
            CouncilMode::Focus => "A selected subset of agents, no automated turns",
            CouncilMode::Crucible => "Work against the shared LaTeX board",
            CouncilMode::Workshop => "Work against the shared code board",
        }
    }
}

impl fmt::Display for CouncilMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CouncilMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" => Ok(CouncilMode::Off),
            "chamber" => Ok(CouncilMode::Chamber),
            "arena" => Ok(CouncilMode::Arena),
            "focus" => Ok(CouncilMode::Focus),
            "crucible" => Ok(CouncilMode::Crucible),
            "workshop" => Ok(CouncilMode::Workshop),
            _ => Err(format!(
                "Invalid council mode: {}. Valid options: off, chamber, arena, focus, crucible, workshop",
                s
            )),
        }
    }
}
