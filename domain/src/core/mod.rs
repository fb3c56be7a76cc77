//! Core domain concepts shared across all subdomains.
//!
//! - [`error::CouncilError`]: the typed error every council operation returns

pub mod error;
