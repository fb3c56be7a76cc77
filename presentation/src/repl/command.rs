//! Operator command parsing.
//!
//! Lines starting with `/` are commands; anything else is spoken into the
//! council as an operator message.

use council_domain::{CouncilMode, VoteChoice};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalCommand {
    On,
    Off,
    Flush,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteCommand {
    Open(String),
    Cast { agent: String, choice: VoteChoice },
    Decide(VoteChoice),
    Accept,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Say(String),
    Convene(String),
    Preserve,
    Mode(CouncilMode),
    Start {
        first_speaker: String,
        max_rounds: Option<u32>,
    },
    Summon(String),
    Stop,
    Team(String),
    ClearTeams,
    Focus(String),
    Hand(String),
    Lower(String),
    Floor,
    Cancel,
    Vote(VoteCommand),
    Temporal(TemporalCommand),
    Timer(Option<u32>),
    Commit { agent: String, text: String },
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub usage: Option<&'static str>,
}

impl ParseError {
    fn usage(usage: &'static str) -> Self {
        Self {
            message: "missing or invalid arguments".to_string(),
            usage: Some(usage),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            usage: None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.usage {
            Some(usage) => write!(f, "{} (usage: {})", self.message, usage),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Command reference shown by `/help`, as (usage, description) pairs.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/convene <topic>", "Start a fresh conversation on a topic"),
    ("/preserve", "Archive the conversation and clear it"),
    ("/say <text>", "Speak as the operator (plain text works too)"),
    ("/mode <name>", "off, chamber, arena, focus, crucible, workshop"),
    ("/start <first> [max]", "Start a Chamber or Arena session"),
    ("/summon <agent>", "Ask one agent to speak; resumes a paused session"),
    ("/stop", "Stop the running session"),
    ("/team <agent>", "Assign an agent to Alpha, then Omega; again to remove"),
    ("/teams clear", "Empty both Arena teams"),
    ("/focus <agent>", "Toggle an agent in the Focus selection"),
    ("/hand <agent>", "Raise an agent's hand"),
    ("/lower <agent>", "Lower an agent's hand"),
    ("/floor", "Open the Free Floor from raised hands"),
    ("/cancel", "Cancel the Free Floor"),
    ("/vote open <question>", "Open a yes/no vote"),
    ("/vote cast <agent> yes|no", "Record an agent's vote"),
    ("/vote decide yes|no", "Close the vote with the operator's decision"),
    ("/vote accept", "Close the vote with the current tally"),
    ("/vote reset", "Discard the vote"),
    ("/temporal on|off|flush", "Control resonance-delayed release"),
    ("/timer <minutes>|clear", "Start or clear the meeting timer"),
    ("/commit <agent> <text>", "Record an agent's commitment"),
    ("/status", "Show the council state"),
    ("/help", "Show this help"),
    ("/quit", "Leave the council"),
];

/// Split off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(arg: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if arg.is_empty() {
        Err(ParseError::usage(usage))
    } else {
        Ok(arg)
    }
}

fn choice(arg: &str, usage: &'static str) -> Result<VoteChoice, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::usage(usage));
    }
    arg.parse().map_err(ParseError::invalid)
}

/// Parse one REPL line. Returns `None` for a blank line.
pub fn parse_command(line: &str) -> Option<Result<OperatorCommand, ParseError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(Ok(OperatorCommand::Say(line.to_string())));
    };
    Some(parse_slash(command))
}

fn parse_slash(command: &str) -> Result<OperatorCommand, ParseError> {
    let (name, args) = split_word(command);

    let parsed = match name.to_ascii_lowercase().as_str() {
        "say" => OperatorCommand::Say(required(args, "/say <text>")?.to_string()),
        "convene" => OperatorCommand::Convene(required(args, "/convene <topic>")?.to_string()),
        "preserve" => OperatorCommand::Preserve,
        "mode" => {
            let mode = required(args, "/mode <name>")?
                .parse()
                .map_err(ParseError::invalid)?;
            OperatorCommand::Mode(mode)
        }
        "start" => {
            let (first, rest) = split_word(args);
            let first_speaker = required(first, "/start <first> [max]")?.to_string();
            let max_rounds = if rest.is_empty() {
                None
            } else {
                let max = rest
                    .parse::<u32>()
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| {
                        ParseError::invalid(format!("max rounds must be a positive number, got {}", rest))
                    })?;
                Some(max)
            };
            OperatorCommand::Start {
                first_speaker,
                max_rounds,
            }
        }
        "summon" => OperatorCommand::Summon(required(args, "/summon <agent>")?.to_string()),
        "stop" => OperatorCommand::Stop,
        "team" => OperatorCommand::Team(required(args, "/team <agent>")?.to_string()),
        "teams" => match args {
            "clear" => OperatorCommand::ClearTeams,
            _ => return Err(ParseError::usage("/teams clear")),
        },
        "focus" => OperatorCommand::Focus(required(args, "/focus <agent>")?.to_string()),
        "hand" | "raise" => OperatorCommand::Hand(required(args, "/hand <agent>")?.to_string()),
        "lower" => OperatorCommand::Lower(required(args, "/lower <agent>")?.to_string()),
        "floor" => OperatorCommand::Floor,
        "cancel" => OperatorCommand::Cancel,
        "vote" => OperatorCommand::Vote(parse_vote(args)?),
        "temporal" => OperatorCommand::Temporal(match args.to_ascii_lowercase().as_str() {
            "on" => TemporalCommand::On,
            "off" => TemporalCommand::Off,
            "flush" => TemporalCommand::Flush,
            _ => return Err(ParseError::usage("/temporal on|off|flush")),
        }),
        "timer" => match args {
            "clear" => OperatorCommand::Timer(None),
            "" => return Err(ParseError::usage("/timer <minutes>|clear")),
            minutes => {
                let minutes = minutes.parse::<u32>().map_err(|_| {
                    ParseError::invalid(format!("timer minutes must be a number, got {}", minutes))
                })?;
                OperatorCommand::Timer(Some(minutes))
            }
        },
        "commit" => {
            let (agent, text) = split_word(args);
            if agent.is_empty() || text.is_empty() {
                return Err(ParseError::usage("/commit <agent> <text>"));
            }
            OperatorCommand::Commit {
                agent: agent.to_string(),
                text: text.to_string(),
            }
        }
        "status" => OperatorCommand::Status,
        "help" | "h" | "?" => OperatorCommand::Help,
        "quit" | "exit" | "q" => OperatorCommand::Quit,
        other => {
            return Err(ParseError::invalid(format!(
                "Unknown command: /{} (type /help for available commands)",
                other
            )));
        }
    };
    Ok(parsed)
}

fn parse_vote(args: &str) -> Result<VoteCommand, ParseError> {
    let (action, rest) = split_word(args);
    match action.to_ascii_lowercase().as_str() {
        "open" => Ok(VoteCommand::Open(
            required(rest, "/vote open <question>")?.to_string(),
        )),
        "cast" => {
            const USAGE: &str = "/vote cast <agent> yes|no";
            let (agent, choice_arg) = split_word(rest);
            let agent = required(agent, USAGE)?.to_string();
            Ok(VoteCommand::Cast {
                agent,
                choice: choice(choice_arg, USAGE)?,
            })
        }
        "decide" => Ok(VoteCommand::Decide(choice(rest, "/vote decide yes|no")?)),
        "accept" => Ok(VoteCommand::Accept),
        "reset" => Ok(VoteCommand::Reset),
        _ => Err(ParseError::usage("/vote open|cast|decide|accept|reset")),
    }
}
