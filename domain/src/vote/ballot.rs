//! Vote primitives: choices and outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single yes/no choice cast by an agent (or imposed by the operator).
///
/// # Example
///
/// ```
/// use council_domain::vote::VoteChoice;
///
/// let choice: VoteChoice = "Yes".parse().unwrap();
/// assert_eq!(choice, VoteChoice::Yes);
/// assert!("maybe".parse::<VoteChoice>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
}

impl FromStr for VoteChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "aye" => Ok(VoteChoice::Yes),
            "no" | "n" | "nay" => Ok(VoteChoice::No),
            other => Err(format!("Unknown vote choice: {}", other)),
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteChoice::Yes => write!(f, "yes"),
            VoteChoice::No => write!(f, "no"),
        }
    }
}

/// Final outcome of a closed vote.
///
/// A tie is its own outcome and is never folded into either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    Yes,
    No,
    Tie,
}

impl VoteOutcome {
    /// Outcome implied by a tally.
    pub fn from_tally(yes: u32, no: u32) -> Self {
        match yes.cmp(&no) {
            std::cmp::Ordering::Greater => VoteOutcome::Yes,
            std::cmp::Ordering::Less => VoteOutcome::No,
            std::cmp::Ordering::Equal => VoteOutcome::Tie,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, VoteOutcome::Tie)
    }
}

impl From<VoteChoice> for VoteOutcome {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Yes => VoteOutcome::Yes,
            VoteChoice::No => VoteOutcome::No,
        }
    }
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOutcome::Yes => write!(f, "yes"),
            VoteOutcome::No => write!(f, "no"),
            VoteOutcome::Tie => write!(f, "tie"),
        }
    }
}
