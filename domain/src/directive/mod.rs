//! Directive tokens embedded in agent replies.

pub mod parsing;

pub use parsing::{Directive, DirectiveScan, parse_directive, scan_directives};
