//! Vote state machine
//!
//! At most one vote is open per council. The state lives inside the
//! conversation record so it is persisted with it.
//!
//! ```text
//! open(question) ──► Open ──record_vote()*──► Open
//!                     │
//!                     ├── accept()  ──► Closed(outcome = tally, tie allowed)
//!                     └── decide(c) ──► Closed(outcome = c)
//! reset() deletes the state from any status.
//! ```

use super::ballot::{VoteChoice, VoteOutcome};
use crate::agent::{AgentId, Speaker};
use crate::core::error::CouncilError;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    Open,
    Closed,
}

/// How a closed vote reached its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The tally was accepted as final
    Tally,
    /// The operator imposed the outcome
    OperatorDecision,
}

/// A yes/no vote held by the council.
///
/// Invariants: `voted` has no duplicates and `yes + no == voted.len()`.
///
/// # Example
///
/// ```
/// use council_domain::agent::{AgentId, Speaker};
/// use council_domain::vote::{VoteChoice, VoteOutcome, VoteState};
///
/// let mut vote = VoteState::open("Proceed?", Speaker::Operator, 0).unwrap();
/// vote.record(AgentId::new("a"), VoteChoice::Yes, 3).unwrap();
/// vote.record(AgentId::new("b"), VoteChoice::No, 3).unwrap();
/// assert_eq!(vote.accept().unwrap(), VoteOutcome::Tie);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteState {
    pub question: String,
    pub yes: u32,
    pub no: u32,
    /// Agents that have voted, in voting order
    pub voted: Vec<AgentId>,
    pub initiator: Speaker,
    pub status: VoteStatus,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VoteOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl VoteState {
    /// Open a new vote. Fails with `Validation` if the question is blank.
    pub fn open(
        question: impl Into<String>,
        initiator: Speaker,
        now: u64,
    ) -> Result<Self, CouncilError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(CouncilError::validation("vote question cannot be empty"));
        }

        Ok(Self {
            question: question.trim().to_string(),
            yes: 0,
            no: 0,
            voted: Vec::new(),
            initiator,
            status: VoteStatus::Open,
            created_at: now,
            outcome: None,
            resolution: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == VoteStatus::Open
    }

    pub fn has_voted(&self, agent: &AgentId) -> bool {
        self.voted.contains(agent)
    }

    /// Record one agent's vote.
    ///
    /// `eligible` is the number of active agents; the voted set can never grow
    /// beyond it. A second vote from the same agent is a `Conflict`.
    pub fn record(
        &mut self,
        agent: AgentId,
        choice: VoteChoice,
        eligible: usize,
    ) -> Result<(), CouncilError> {
        self.ensure_open()?;

        if self.has_voted(&agent) {
            return Err(CouncilError::conflict(format!(
                "{} has already voted on \"{}\"",
                agent, self.question
            )));
        }
        if self.voted.len() >= eligible {
            return Err(CouncilError::conflict(
                "every active agent has already voted",
            ));
        }

        match choice {
            VoteChoice::Yes => self.yes += 1,
            VoteChoice::No => self.no += 1,
        }
        self.voted.push(agent);
        Ok(())
    }

    /// Close the vote using the current tally. Ties are reported as such.
    pub fn accept(&mut self) -> Result<VoteOutcome, CouncilError> {
        self.ensure_open()?;
        let outcome = VoteOutcome::from_tally(self.yes, self.no);
        self.close(outcome, Resolution::Tally);
        Ok(outcome)
    }

    /// Operator override: close the vote with `choice` regardless of the tally.
    pub fn decide(&mut self, choice: VoteChoice) -> Result<VoteOutcome, CouncilError> {
        self.ensure_open()?;
        let outcome = VoteOutcome::from(choice);
        self.close(outcome, Resolution::OperatorDecision);
        Ok(outcome)
    }

    /// Outcome the tally currently points to.
    pub fn leading(&self) -> VoteOutcome {
        VoteOutcome::from_tally(self.yes, self.no)
    }

    /// Short textual tally, e.g. "3 yes / 2 no".
    pub fn tally_summary(&self) -> String {
        format!("{} yes / {} no", self.yes, self.no)
    }

    fn close(&mut self, outcome: VoteOutcome, resolution: Resolution) {
        self.status = VoteStatus::Closed;
        self.outcome = Some(outcome);
        self.resolution = Some(resolution);
    }

    fn ensure_open(&self) -> Result<(), CouncilError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CouncilError::precondition(format!(
                "vote \"{}\" is already closed",
                self.question
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_vote() -> VoteState {
        VoteState::open("Proceed?", Speaker::Operator, 42).unwrap()
    }

    fn cast(vote: &mut VoteState, yes: usize, no: usize) {
        let eligible = yes + no;
        for i in 0..yes {
            vote.record(AgentId::new(format!("y{}", i)), VoteChoice::Yes, eligible)
                .unwrap();
        }
        for i in 0..no {
            vote.record(AgentId::new(format!("n{}", i)), VoteChoice::No, eligible)
                .unwrap();
        }
    }

    #[test]
    fn test_open_rejects_blank_question() {
        let result = VoteState::open("   ", Speaker::Operator, 0);
        assert!(matches!(result, Err(CouncilError::Validation(_))));
    }

    #[test]
    fn test_accept_majority_yes() {
        let mut vote = open_vote();
        cast(&mut vote, 3, 2);
        assert_eq!(vote.accept().unwrap(), VoteOutcome::Yes);
        assert_eq!(vote.status, VoteStatus::Closed);
        assert_eq!(vote.outcome, Some(VoteOutcome::Yes));
        assert_eq!(vote.resolution, Some(Resolution::Tally));
    }

    #[test]
    fn test_accept_tie_is_distinct() {
        let mut vote = open_vote();
        cast(&mut vote, 2, 2);
        assert_eq!(vote.accept().unwrap(), VoteOutcome::Tie);
        assert!(vote.outcome.unwrap().is_tie());
    }

    #[test]
    fn test_duplicate_vote_is_conflict() {
        let mut vote = open_vote();
        vote.record(AgentId::new("a"), VoteChoice::Yes, 3).unwrap();
        let second = vote.record(AgentId::new("a"), VoteChoice::No, 3);
        assert!(matches!(second, Err(CouncilError::Conflict(_))));
        assert_eq!(vote.yes, 1);
        assert_eq!(vote.no, 0);
        assert_eq!(vote.voted.len(), 1);
    }

    #[test]
    fn test_voted_never_exceeds_eligible() {
        let mut vote = open_vote();
        vote.record(AgentId::new("a"), VoteChoice::Yes, 1).unwrap();
        let result = vote.record(AgentId::new("b"), VoteChoice::Yes, 1);
        assert!(matches!(result, Err(CouncilError::Conflict(_))));
        assert!(vote.yes + vote.no <= vote.voted.len() as u32);
    }

    #[test]
    fn test_decide_overrides_tally() {
        let mut vote = open_vote();
        cast(&mut vote, 4, 1);
        assert_eq!(vote.decide(VoteChoice::No).unwrap(), VoteOutcome::No);
        assert_eq!(vote.resolution, Some(Resolution::OperatorDecision));
        assert_eq!(vote.yes, 4);
    }

    #[test]
    fn test_closed_vote_rejects_changes() {
        let mut vote = open_vote();
        vote.accept().unwrap();
        assert!(matches!(
            vote.record(AgentId::new("a"), VoteChoice::Yes, 3),
            Err(CouncilError::Precondition(_))
        ));
        assert!(matches!(vote.accept(), Err(CouncilError::Precondition(_))));
        assert!(matches!(
            vote.decide(VoteChoice::Yes),
            Err(CouncilError::Precondition(_))
        ));
    }

    #[test]
    fn test_tally_summary() {
        let mut vote = open_vote();
        cast(&mut vote, 1, 2);
        assert_eq!(vote.tally_summary(), "1 yes / 2 no");
        assert_eq!(vote.leading(), VoteOutcome::No);
    }
}
