//! Vote coordinator commands.
//!
//! The vote lives on the conversation record, so every change is persisted.
//! Changes are staged on a copy of the record and only adopted once the store
//! accepts it. A second vote from the same agent is rejected with `Conflict`
//! rather than ignored.

use super::CouncilController;
use crate::ports::council_event::CouncilEvent;
use council_domain::{CouncilError, Resolution, Speaker, VoteChoice, VoteOutcome, VoteState};
use tracing::info;

impl CouncilController {
    pub(super) async fn open_vote(&mut self, question: String) -> Result<(), CouncilError> {
        if let Some(vote) = &self.record.vote
            && vote.is_open()
        {
            return Err(CouncilError::conflict(format!(
                "a vote is already open: \"{}\"",
                vote.question
            )));
        }

        let vote = VoteState::open(question, Speaker::Operator, self.now())?;
        let question = vote.question.clone();
        let mut staged = self.record.clone();
        staged.vote = Some(vote);
        self.commit_record(staged).await?;

        info!(question = %question, "Vote opened");
        self.transcript("vote_opened", serde_json::json!({ "question": question }));
        self.emit(CouncilEvent::VoteOpened { question });
        Ok(())
    }

    pub(super) async fn cast_vote(
        &mut self,
        reference: &str,
        choice: VoteChoice,
    ) -> Result<VoteState, CouncilError> {
        let agent = self.resolve_agent(reference)?;
        let eligible = self.registry.len();
        let mut staged = self.record.clone();
        let vote = staged
            .vote
            .as_mut()
            .ok_or_else(|| CouncilError::precondition("no vote to cast on"))?;

        vote.record(agent.clone(), choice, eligible)?;
        let snapshot = vote.clone();
        self.commit_record(staged).await?;

        info!(agent = %agent, choice = %choice, tally = %snapshot.tally_summary(), "Vote recorded");
        self.emit(CouncilEvent::VoteTallied {
            agent,
            yes: snapshot.yes,
            no: snapshot.no,
        });
        Ok(snapshot)
    }

    /// Close with the tally as the outcome. A tie is reported as a tie.
    pub(super) async fn accept_vote(&mut self) -> Result<VoteOutcome, CouncilError> {
        self.close_vote(|vote| vote.accept()).await
    }

    /// Operator override: close with `choice` regardless of the tally.
    pub(super) async fn decide_vote(
        &mut self,
        choice: VoteChoice,
    ) -> Result<VoteOutcome, CouncilError> {
        self.close_vote(|vote| vote.decide(choice)).await
    }

    /// Delete the vote whatever its status.
    pub(super) async fn reset_vote(&mut self) -> Result<(), CouncilError> {
        if self.record.vote.is_some() {
            let mut staged = self.record.clone();
            staged.vote = None;
            self.commit_record(staged).await?;
            info!("Vote reset");
        }
        self.emit(CouncilEvent::VoteReset);
        Ok(())
    }

    async fn close_vote(
        &mut self,
        close: impl FnOnce(&mut VoteState) -> Result<VoteOutcome, CouncilError>,
    ) -> Result<VoteOutcome, CouncilError> {
        let mut staged = self.record.clone();
        let vote = staged
            .vote
            .as_mut()
            .ok_or_else(|| CouncilError::precondition("no vote is open"))?;

        let outcome = close(vote)?;
        let question = vote.question.clone();
        let resolution = vote.resolution.unwrap_or(Resolution::Tally);
        let tally = vote.tally_summary();
        self.commit_record(staged).await?;

        info!(question = %question, outcome = %outcome, tally = %tally, "Vote closed");
        self.transcript(
            "vote_closed",
            serde_json::json!({
                "question": question,
                "outcome": outcome.to_string(),
                "tally": tally,
            }),
        );
        self.emit(CouncilEvent::VoteClosed {
            question,
            outcome,
            resolution,
        });
        Ok(outcome)
    }
}
