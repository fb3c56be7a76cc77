//! Command channel into the council controller.

use super::snapshot::CouncilSnapshot;
use council_domain::{
    Assignment, CouncilError, CouncilMode, SessionKind, VoteChoice, VoteOutcome, VoteState,
};
use tokio::sync::{mpsc, oneshot};

type Reply<T> = oneshot::Sender<Result<T, CouncilError>>;

/// Commands processed by the controller task, one at a time.
pub(super) enum CouncilCommand {
    Convene {
        topic: String,
        reply: Reply<()>,
    },
    Preserve {
        reply: Reply<String>,
    },
    Speak {
        content: String,
        image: Option<String>,
        reply: Reply<()>,
    },
    SetMode {
        mode: CouncilMode,
        reply: Reply<()>,
    },
    StartSession {
        kind: SessionKind,
        first_speaker: String,
        max_rounds: Option<u32>,
        reply: Reply<()>,
    },
    Summon {
        agent: String,
        reply: Reply<()>,
    },
    Stop {
        reply: Reply<()>,
    },
    AssignTeam {
        agent: String,
        reply: Reply<Assignment>,
    },
    ClearTeams {
        reply: Reply<()>,
    },
    ToggleFocus {
        agent: String,
        reply: Reply<bool>,
    },
    RaiseHand {
        agent: String,
        reply: Reply<bool>,
    },
    LowerHand {
        agent: String,
        reply: Reply<bool>,
    },
    OpenFloor {
        reply: Reply<Vec<council_domain::AgentId>>,
    },
    CancelFloor {
        reply: Reply<()>,
    },
    OpenVote {
        question: String,
        reply: Reply<()>,
    },
    CastVote {
        agent: String,
        choice: VoteChoice,
        reply: Reply<VoteState>,
    },
    DecideVote {
        choice: VoteChoice,
        reply: Reply<VoteOutcome>,
    },
    AcceptVote {
        reply: Reply<VoteOutcome>,
    },
    ResetVote {
        reply: Reply<()>,
    },
    SetTemporal {
        enabled: bool,
        reply: Reply<usize>,
    },
    FlushTemporal {
        reply: Reply<usize>,
    },
    StartTimer {
        minutes: u32,
        reply: Reply<()>,
    },
    ClearTimer {
        reply: Reply<()>,
    },
    Commit {
        agent: String,
        text: String,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<CouncilSnapshot>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

/// Cloneable handle to a running council controller.
///
/// Agent references are resolved by the controller against the registry and
/// may be either an agent id or its display name.
#[derive(Clone)]
pub struct CouncilHandle {
    tx: mpsc::UnboundedSender<CouncilCommand>,
}

impl CouncilHandle {
    pub(super) fn new(tx: mpsc::UnboundedSender<CouncilCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> CouncilCommand,
    ) -> Result<T, CouncilError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| CouncilError::Shutdown)?;
        rx.await.map_err(|_| CouncilError::Shutdown)?
    }

    // ==================== Council record ====================

    /// Clear the record and start a new conversation on `topic`.
    pub async fn convene(&self, topic: impl Into<String>) -> Result<(), CouncilError> {
        let topic = topic.into();
        self.request(|reply| CouncilCommand::Convene { topic, reply })
            .await
    }

    /// Archive then clear the record. Returns the archive label.
    pub async fn preserve(&self) -> Result<String, CouncilError> {
        self.request(|reply| CouncilCommand::Preserve { reply }).await
    }

    pub async fn speak(
        &self,
        content: impl Into<String>,
        image: Option<String>,
    ) -> Result<(), CouncilError> {
        let content = content.into();
        self.request(|reply| CouncilCommand::Speak {
            content,
            image,
            reply,
        })
        .await
    }

    pub async fn raise_hand(&self, agent: impl Into<String>) -> Result<bool, CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::RaiseHand { agent, reply })
            .await
    }

    pub async fn lower_hand(&self, agent: impl Into<String>) -> Result<bool, CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::LowerHand { agent, reply })
            .await
    }

    pub async fn start_timer(&self, minutes: u32) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::StartTimer { minutes, reply })
            .await
    }

    pub async fn clear_timer(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::ClearTimer { reply })
            .await
    }

    pub async fn commit(
        &self,
        agent: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), CouncilError> {
        let agent = agent.into();
        let text = text.into();
        self.request(|reply| CouncilCommand::Commit { agent, text, reply })
            .await
    }

    // ==================== Modes ====================

    pub async fn set_mode(&self, mode: CouncilMode) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::SetMode { mode, reply })
            .await
    }

    pub async fn assign_team_member(
        &self,
        agent: impl Into<String>,
    ) -> Result<Assignment, CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::AssignTeam { agent, reply })
            .await
    }

    pub async fn clear_teams(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::ClearTeams { reply })
            .await
    }

    pub async fn toggle_focus(&self, agent: impl Into<String>) -> Result<bool, CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::ToggleFocus { agent, reply })
            .await
    }

    // ==================== Chamber / Arena ====================

    /// Start a Chamber session. `max_rounds` defaults to the configured cap.
    pub async fn start_chamber(
        &self,
        first_speaker: impl Into<String>,
        max_rounds: Option<u32>,
    ) -> Result<(), CouncilError> {
        self.start(SessionKind::Chamber, first_speaker.into(), max_rounds)
            .await
    }

    /// Start an Arena session with the current team rosters.
    pub async fn start_arena(
        &self,
        first_speaker: impl Into<String>,
        max_rounds: Option<u32>,
    ) -> Result<(), CouncilError> {
        self.start(SessionKind::Arena, first_speaker.into(), max_rounds)
            .await
    }

    async fn start(
        &self,
        kind: SessionKind,
        first_speaker: String,
        max_rounds: Option<u32>,
    ) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::StartSession {
            kind,
            first_speaker,
            max_rounds,
            reply,
        })
        .await
    }

    /// Manually summon an agent; resumes a paused session.
    pub async fn summon(&self, agent: impl Into<String>) -> Result<(), CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::Summon { agent, reply })
            .await
    }

    pub async fn stop(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::Stop { reply }).await
    }

    // ==================== Free Floor ====================

    /// Open the floor from raised hands. Returns the queue in speaking order.
    pub async fn open_floor(&self) -> Result<Vec<council_domain::AgentId>, CouncilError> {
        self.request(|reply| CouncilCommand::OpenFloor { reply })
            .await
    }

    pub async fn cancel_floor(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::CancelFloor { reply })
            .await
    }

    // ==================== Votes ====================

    pub async fn open_vote(&self, question: impl Into<String>) -> Result<(), CouncilError> {
        let question = question.into();
        self.request(|reply| CouncilCommand::OpenVote { question, reply })
            .await
    }

    pub async fn cast_vote(
        &self,
        agent: impl Into<String>,
        choice: VoteChoice,
    ) -> Result<VoteState, CouncilError> {
        let agent = agent.into();
        self.request(|reply| CouncilCommand::CastVote {
            agent,
            choice,
            reply,
        })
        .await
    }

    pub async fn decide_vote(&self, choice: VoteChoice) -> Result<VoteOutcome, CouncilError> {
        self.request(|reply| CouncilCommand::DecideVote { choice, reply })
            .await
    }

    pub async fn accept_vote(&self) -> Result<VoteOutcome, CouncilError> {
        self.request(|reply| CouncilCommand::AcceptVote { reply })
            .await
    }

    pub async fn reset_vote(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::ResetVote { reply })
            .await
    }

    // ==================== Temporal ====================

    /// Enable or disable temporal release. Returns how many buffered
    /// messages a disable flushed.
    pub async fn set_temporal(&self, enabled: bool) -> Result<usize, CouncilError> {
        self.request(|reply| CouncilCommand::SetTemporal { enabled, reply })
            .await
    }

    pub async fn flush_temporal(&self) -> Result<usize, CouncilError> {
        self.request(|reply| CouncilCommand::FlushTemporal { reply })
            .await
    }

    // ==================== Lifecycle ====================

    pub async fn snapshot(&self) -> Result<CouncilSnapshot, CouncilError> {
        self.request(|reply| CouncilCommand::Snapshot { reply })
            .await
    }

    /// Stop the controller. Buffered temporal messages are released first.
    pub async fn shutdown(&self) -> Result<(), CouncilError> {
        self.request(|reply| CouncilCommand::Shutdown { reply })
            .await
    }
}
