//! Council orchestration domain
//!
//! Mode selection plus the state machines that run inside a mode: the
//! Chamber/Arena turn scheduler, the Free Floor queue, Arena rosters and the
//! Focus selection set.

pub mod arena;
pub mod chamber;
pub mod focus;
pub mod free_floor;
pub mod mode;

pub use arena::{ArenaTeams, Assignment, TEAM_CAPACITY, Team};
pub use chamber::{
    ChamberSession, DEFAULT_MAX_ROUNDS, PauseReason, SessionKind, TurnOutcome, TurnPlan,
    TurnReport,
};
pub use focus::FocusSelection;
pub use free_floor::FreeFloorQueue;
pub use mode::{BoardKind, CouncilMode};
