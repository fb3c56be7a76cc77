//! Read-only view of a council for status displays.

use super::CouncilController;
use council_domain::{
    AgentId, ArenaTeams, CouncilMode, PauseReason, SessionKind, VoteState,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub kind: SessionKind,
    pub round: u32,
    pub max_rounds: u32,
    pub first_speaker: AgentId,
    pub running: bool,
    pub paused: Option<PauseReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouncilSnapshot {
    pub council_id: String,
    pub topic: String,
    pub mode: CouncilMode,
    pub message_count: usize,
    pub session: Option<SessionSnapshot>,
    /// Agent whose reply is being generated
    pub speaking: Option<AgentId>,
    pub floor_active: bool,
    pub floor_queue: Vec<AgentId>,
    pub raised_hands: Vec<AgentId>,
    pub vote: Option<VoteState>,
    pub temporal_enabled: bool,
    pub temporal_pending: usize,
    pub teams: ArenaTeams,
    pub focus: Vec<AgentId>,
    pub timer_remaining_ms: Option<u64>,
    pub commitments: usize,
}

impl CouncilController {
    pub(super) fn snapshot(&self) -> CouncilSnapshot {
        CouncilSnapshot {
            council_id: self.config.council_id().to_string(),
            topic: self.record.topic.clone(),
            mode: self.mode,
            message_count: self.record.messages.len(),
            session: self.session.as_ref().map(|s| SessionSnapshot {
                kind: s.kind(),
                round: s.round(),
                max_rounds: s.max_rounds(),
                first_speaker: s.first_speaker().clone(),
                running: s.is_running(),
                paused: s.pause_reason().cloned(),
            }),
            speaking: self.in_flight.as_ref().map(|f| f.agent.clone()),
            floor_active: self.floor.is_active(),
            floor_queue: self.floor.remaining().cloned().collect(),
            raised_hands: self.record.raised_hands.clone(),
            vote: self.record.vote.clone(),
            temporal_enabled: self.temporal.is_enabled(),
            temporal_pending: self.temporal.pending(),
            teams: self.teams.clone(),
            focus: self.focus.selected().to_vec(),
            timer_remaining_ms: self.record.timer_remaining_ms(self.now()),
            commitments: self.record.commitments.len(),
        }
    }
}
