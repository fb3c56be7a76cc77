//! Presentation layer for council
//!
//! This crate contains the CLI definition, the operator command parser,
//! console rendering of council events, and the interactive REPL.

pub mod cli;
pub mod output;
pub mod progress;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use progress::indicator::WaitIndicator;
pub use repl::CouncilRepl;
pub use repl::command::{OperatorCommand, ParseError, parse_command};
