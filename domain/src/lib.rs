//! Domain layer for council
//!
//! This crate contains the orchestration state machines, entities, and value
//! objects. It has no dependencies on infrastructure or presentation concerns
//! and never reads a clock or sleeps: every time-dependent operation takes
//! `now` in milliseconds from its caller.
//!
//! # Core Concepts
//!
//! ## Modes
//!
//! A council runs in exactly one [`CouncilMode`] at a time. Chamber and Arena
//! are driven by the [`ChamberSession`] turn scheduler; Off, Crucible and
//! Workshop admit the [`FreeFloorQueue`]; Focus only tracks a selection.
//!
//! ## Votes and temporal release
//!
//! The [`VoteState`] and the [`TemporalRelease`] gate run alongside whichever
//! mode is active.

pub mod agent;
pub mod conversation;
pub mod core;
pub mod directive;
pub mod orchestration;
pub mod temporal;
pub mod util;
pub mod vote;

// Re-export commonly used types
pub use agent::{AgentId, AgentProfile, AgentRegistry, RING_POSITIONS, Speaker};
pub use conversation::{Commitment, ConversationRecord, Message};
pub use core::error::CouncilError;
pub use directive::{Directive, DirectiveScan, parse_directive, scan_directives};
pub use orchestration::{
    ArenaTeams, Assignment, BoardKind, ChamberSession, CouncilMode, DEFAULT_MAX_ROUNDS,
    FocusSelection, FreeFloorQueue, PauseReason, SessionKind, Team, TurnOutcome, TurnPlan,
    TurnReport,
};
pub use temporal::{Arrival, PhaseClock, ReleaseDelay, TemporalEntry, TemporalRelease};
pub use vote::{Resolution, VoteChoice, VoteOutcome, VoteState, VoteStatus};
