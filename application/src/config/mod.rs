//! Application-level configuration.
//!
//! - [`TimingParams`]: handoff delay, floor countdown, temporal clock
//! - [`CouncilConfig`]: council id, session defaults and timing

pub mod council_config;
pub mod timing;

pub use council_config::CouncilConfig;
pub use timing::TimingParams;
