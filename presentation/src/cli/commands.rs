//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Council - orchestrate a conversation between agent personas")]
#[command(long_about = r#"
Council runs an operator console over a council of agent personas.

Modes:
  chamber   Agents hand the floor to each other with [NEXT: name]
  arena     Chamber turns restricted to two teams
  off       Open conversation; raised hands queue up for the Free Floor
  focus, crucible, workshop

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. COUNCIL_* environment variables
3. ./council.toml      Project-level config
4. ~/.config/council/config.toml   Global config

Example:
  council --config harbor.toml
  council -vv --log-dir ./logs --transcript harbor.jsonl
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress wait spinners
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Write tracing output to a daily file in this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write a JSONL transcript of council events (overrides [logging] transcript)
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,
}
