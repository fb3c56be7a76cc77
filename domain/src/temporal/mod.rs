//! Temporal resonance: phase-delayed presentation of agent messages.
//!
//! Release timing only. The conversation log keeps its append order; the
//! audience sees messages in `release_at` order, which may differ.

pub mod buffer;
pub mod phase;
pub mod release;

pub use buffer::{TemporalBuffer, TemporalEntry};
pub use phase::{DEFAULT_PERIOD_MS, PhaseClock, ReleaseDelay, base_phase, resonance};
pub use release::{Arrival, TemporalRelease};
