//! Chamber session - the scripted sequential-handoff state machine.
//!
//! A session is a series of turns. Each turn names a speaker, the speaker's
//! reply is scanned for directives, and the result decides what happens next:
//!
//! ```text
//!                start(first)
//!                     │
//!                     ▼
//!   ┌──────────► begin_turn(agent) ── round += 1 (clamped to max_rounds)
//!   │                 │               round == max_rounds → speaker := first_speaker
//!   │                 ▼
//!   │          reply from agent ──── failure ──► Paused(ResponseFailed)
//!   │                 │
//!   │                 ▼
//!   │          complete_turn(reply)
//!   │            ├── forced turn          ──► ForcedEnd   (always ends)
//!   │            ├── [CONCLUDE] by terminator ► Concluded
//!   │            ├── [NEXT: x] resolves   ──► Handoff(x)
//!   └────────────┘
//!                └── anything else        ──► Paused(NoValidNextSpeaker)
//! ```
//!
//! A paused session only moves again when the operator summons an agent.
//! Arena sessions use the same machine with handoff targets restricted to the
//! team rosters.

use super::arena::ArenaTeams;
use crate::agent::{AgentId, AgentRegistry};
use crate::core::error::CouncilError;
use crate::directive::{Directive, scan_directives};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default round cap for a session
pub const DEFAULT_MAX_ROUNDS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Chamber,
    Arena,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Chamber => write!(f, "chamber"),
            SessionKind::Arena => write!(f, "arena"),
        }
    }
}

/// Why a session stopped running without ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// The reply carried no handoff, or named someone who is not a valid participant
    NoValidNextSpeaker { requested: Option<String> },
    /// The Agent Response Service failed for this turn
    ResponseFailed { agent: AgentId, error: String },
}

impl PauseReason {
    /// The error surfaced to the operator for this pause
    pub fn to_error(&self) -> CouncilError {
        match self {
            PauseReason::NoValidNextSpeaker { requested: Some(name) } => {
                CouncilError::not_found(format!("no valid next speaker (requested \"{}\")", name))
            }
            PauseReason::NoValidNextSpeaker { requested: None } => {
                CouncilError::not_found("no valid next speaker")
            }
            PauseReason::ResponseFailed { agent, error } => {
                CouncilError::transient(format!("{} failed to respond: {}", agent, error))
            }
        }
    }
}

/// The speaker and round for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    pub speaker: AgentId,
    pub round: u32,
    /// The round cap was reached and the first speaker was forced in
    pub forced: bool,
}

/// What a completed turn leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Hand the floor to this agent after the handoff delay
    Handoff(AgentId),
    /// The terminator concluded the session
    Concluded,
    /// The forced synthesis turn finished; the session is over
    ForcedEnd,
    /// The session stopped running and waits for the operator
    Paused(PauseReason),
}

impl TurnOutcome {
    /// Whether the session is over and should be discarded.
    pub fn ends_session(&self) -> bool {
        matches!(self, TurnOutcome::Concluded | TurnOutcome::ForcedEnd)
    }
}

/// Outcome plus diagnostics for a completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    /// A conclusion token was present but the speaker is not the terminator
    pub ignored_conclusion: bool,
}

/// Runtime state of one Chamber or Arena session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChamberSession {
    kind: SessionKind,
    round: u32,
    max_rounds: u32,
    first_speaker: AgentId,
    running: bool,
    teams: Option<ArenaTeams>,
    paused: Option<PauseReason>,
}

impl ChamberSession {
    /// Start a Chamber session.
    pub fn chamber(
        first_speaker: AgentId,
        max_rounds: u32,
        registry: &AgentRegistry,
    ) -> Result<Self, CouncilError> {
        Self::validate_common(&first_speaker, max_rounds, registry)?;
        Ok(Self::new(SessionKind::Chamber, first_speaker, max_rounds, None))
    }

    /// Start an Arena session. Both teams must have at least one member.
    pub fn arena(
        first_speaker: AgentId,
        max_rounds: u32,
        teams: ArenaTeams,
        registry: &AgentRegistry,
    ) -> Result<Self, CouncilError> {
        Self::validate_common(&first_speaker, max_rounds, registry)?;
        if let Some(team) = teams.empty_team() {
            return Err(CouncilError::validation(format!("team {} is empty", team)));
        }
        if !teams.contains(&first_speaker) {
            return Err(CouncilError::validation(format!(
                "first speaker {} is not on a team",
                first_speaker
            )));
        }
        Ok(Self::new(
            SessionKind::Arena,
            first_speaker,
            max_rounds,
            Some(teams),
        ))
    }

    fn new(
        kind: SessionKind,
        first_speaker: AgentId,
        max_rounds: u32,
        teams: Option<ArenaTeams>,
    ) -> Self {
        Self {
            kind,
            round: 0,
            max_rounds,
            first_speaker,
            running: true,
            teams,
            paused: None,
        }
    }

    fn validate_common(
        first_speaker: &AgentId,
        max_rounds: u32,
        registry: &AgentRegistry,
    ) -> Result<(), CouncilError> {
        if first_speaker.as_str().trim().is_empty() {
            return Err(CouncilError::validation("first speaker is not set"));
        }
        if !registry.contains(first_speaker) {
            return Err(CouncilError::validation(format!(
                "first speaker {} is not an active agent",
                first_speaker
            )));
        }
        if max_rounds == 0 {
            return Err(CouncilError::validation("max rounds must be at least 1"));
        }
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn first_speaker(&self) -> &AgentId {
        &self.first_speaker
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn teams(&self) -> Option<&ArenaTeams> {
        self.teams.as_ref()
    }

    pub fn pause_reason(&self) -> Option<&PauseReason> {
        self.paused.as_ref()
    }

    // ==================== Transitions ====================

    /// Re-arm a paused session for an operator summon.
    pub fn resume(&mut self) {
        self.running = true;
        self.paused = None;
    }

    /// Begin a turn for `requested`.
    ///
    /// Fails with `Precondition` if the session is not running. Once the round
    /// cap is reached the first speaker is forced in regardless of `requested`.
    pub fn begin_turn(&mut self, requested: AgentId) -> Result<TurnPlan, CouncilError> {
        if !self.running {
            return Err(CouncilError::precondition("session is not running"));
        }

        self.round = (self.round + 1).min(self.max_rounds);
        let forced = self.round >= self.max_rounds;
        let speaker = if forced {
            self.first_speaker.clone()
        } else {
            requested
        };

        Ok(TurnPlan {
            speaker,
            round: self.round,
            forced,
        })
    }

    /// Apply a successful reply to the session.
    pub fn complete_turn(
        &mut self,
        plan: &TurnPlan,
        reply: &str,
        registry: &AgentRegistry,
    ) -> TurnReport {
        let scan = scan_directives(reply);
        let is_terminator = registry.is_terminator(&plan.speaker);
        let ignored_conclusion = scan.ignored_conclusion(is_terminator);

        let outcome = if plan.forced {
            TurnOutcome::ForcedEnd
        } else {
            match scan.resolve(is_terminator) {
                Directive::Conclude => TurnOutcome::Concluded,
                Directive::Handoff(reference) => match self.resolve_target(&reference, registry) {
                    Some(next) => TurnOutcome::Handoff(next),
                    None => TurnOutcome::Paused(PauseReason::NoValidNextSpeaker {
                        requested: Some(reference),
                    }),
                },
                Directive::None => {
                    TurnOutcome::Paused(PauseReason::NoValidNextSpeaker { requested: None })
                }
            }
        };

        match &outcome {
            TurnOutcome::Handoff(_) => {}
            TurnOutcome::Concluded | TurnOutcome::ForcedEnd => self.running = false,
            TurnOutcome::Paused(reason) => self.pause(reason.clone()),
        }

        TurnReport {
            outcome,
            ignored_conclusion,
        }
    }

    /// Record a failed reply: the session pauses and is not retried.
    pub fn fail_turn(&mut self, plan: &TurnPlan, error: impl Into<String>) -> PauseReason {
        let reason = PauseReason::ResponseFailed {
            agent: plan.speaker.clone(),
            error: error.into(),
        };
        self.pause(reason.clone());
        reason
    }

    /// Whether `agent` may be handed the floor in this session.
    pub fn accepts_speaker(&self, agent: &AgentId, registry: &AgentRegistry) -> bool {
        registry.contains(agent)
            && self
                .teams
                .as_ref()
                .is_none_or(|teams| teams.contains(agent))
    }

    fn resolve_target(&self, reference: &str, registry: &AgentRegistry) -> Option<AgentId> {
        let profile = registry.resolve(reference)?;
        self.accepts_speaker(&profile.id, registry)
            .then(|| profile.id.clone())
    }

    fn pause(&mut self, reason: PauseReason) {
        self.running = false;
        self.paused = Some(reason);
    }
}
