//! Council vote domain
//!
//! A council holds at most one yes/no vote at a time. Agents cast votes, the
//! operator may accept the tally or impose an outcome, and a tie is always
//! reported as a tie.

pub mod ballot;
pub mod state;

pub use ballot::{VoteChoice, VoteOutcome};
pub use state::{Resolution, VoteState, VoteStatus};
