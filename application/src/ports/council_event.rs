//! Council event types emitted by the council controller for presentation
//!
//! These events form the output port from the application layer to the
//! presentation layer. Command results are returned through the handle; these
//! events report everything that happens on the controller's own schedule
//! (agent replies, handoffs, countdowns, releases).

use council_domain::{
    AgentId, ArenaTeams, BoardKind, CouncilMode, Message, PauseReason, Resolution, SessionKind,
    VoteOutcome,
};
use std::time::Duration;

/// Why a Chamber/Arena session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The terminator issued a conclusion directive
    Concluded { by: AgentId },
    /// The forced synthesis turn at the round cap finished
    RoundLimit { speaker: AgentId },
    /// The operator stopped the session
    Stopped,
}

/// Events emitted by the council controller
#[derive(Debug, Clone)]
pub enum CouncilEvent {
    // === Messages ===
    /// A message was appended to the canonical log
    MessageAppended { message: Message },
    /// A message became visible to the audience
    MessageReleased {
        message: Message,
        voice: Option<String>,
    },

    // === Chamber / Arena ===
    SessionStarted {
        kind: SessionKind,
        first_speaker: AgentId,
        max_rounds: u32,
    },
    /// An agent was asked to speak (`round` is `None` on the Free Floor)
    TurnStarted {
        agent: AgentId,
        round: Option<u32>,
        forced: bool,
    },
    /// A conclusion token from a non-terminator was ignored
    ConclusionIgnored { agent: AgentId },
    HandoffScheduled { next: AgentId, delay: Duration },
    SessionPaused { reason: PauseReason },
    SessionEnded { reason: SessionEndReason },

    // === Free Floor ===
    FloorOpened { queue: Vec<AgentId> },
    /// Countdown before the next floor speaker is invoked
    FloorCountdown { next: AgentId, delay: Duration },
    FloorSpeakerDropped { agent: AgentId, error: String },
    /// The floor closed; `exhausted` is false when it was cancelled
    FloorClosed { exhausted: bool },

    // === Votes ===
    VoteOpened { question: String },
    VoteTallied { agent: AgentId, yes: u32, no: u32 },
    VoteClosed {
        question: String,
        outcome: VoteOutcome,
        resolution: Resolution,
    },
    VoteReset,

    // === Mode / selection ===
    ModeChanged {
        mode: CouncilMode,
        board: Option<BoardKind>,
    },
    TeamsChanged { teams: ArenaTeams },
    FocusChanged { selected: Vec<AgentId> },

    // === Temporal ===
    TemporalToggled { enabled: bool, flushed: usize },
    /// A message is held back for `delay`
    MessageDeferred { agent: AgentId, delay: Duration },

    // === Council record ===
    Convened { topic: String },
    Preserved { archive: String },
    HandRaised { agent: AgentId },
    HandLowered { agent: AgentId },
    TimerChanged { minutes: Option<u32> },
    Committed { agent: AgentId, text: String },

    /// A background operation failed without affecting control flow
    Warning { message: String },
}
