//! Operator REPL
//!
//! Reads commands with rustyline and forwards them to the council handle.
//! Council events are printed by a background task as they arrive, so agent
//! replies show up while the operator is typing.

pub mod command;

use crate::output::console::ConsoleFormatter;
use crate::progress::indicator::WaitIndicator;
use colored::Colorize;
use command::{OperatorCommand, TemporalCommand, VoteCommand, parse_command};
use council_application::{CouncilEvent, CouncilHandle};
use council_domain::{AgentRegistry, CouncilError, CouncilMode};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Interactive operator console for one council
pub struct CouncilRepl {
    handle: CouncilHandle,
    registry: Arc<AgentRegistry>,
    show_progress: bool,
    history_path: Option<PathBuf>,
}

enum Flow {
    Continue,
    Quit,
}

impl CouncilRepl {
    pub fn new(handle: CouncilHandle, registry: Arc<AgentRegistry>) -> Self {
        Self {
            handle,
            registry,
            show_progress: true,
            history_path: dirs::data_dir().map(|p| p.join("council").join("history.txt")),
        }
    }

    /// Set whether to show wait spinners
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Run until `/quit` or end of input, then shut the council down.
    ///
    /// Must run on a multi-threaded runtime: line reads block the current
    /// worker via `block_in_place`.
    pub async fn run(self, events: mpsc::UnboundedReceiver<CouncilEvent>) -> RlResult<()> {
        let printer = spawn_event_printer(events, Arc::clone(&self.registry), self.show_progress);

        let mut rl = DefaultEditor::new()?;
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome().await;

        loop {
            let readline = tokio::task::block_in_place(|| rl.readline("council> "));

            match readline {
                Ok(line) => {
                    let Some(parsed) = parse_command(&line) else {
                        continue;
                    };
                    let _ = rl.add_history_entry(line.trim());

                    let command = match parsed {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{} {}", "Error:".red().bold(), e);
                            continue;
                        }
                    };

                    match self.execute(command).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(CouncilError::Shutdown) => {
                            println!("{}", ConsoleFormatter::error(&CouncilError::Shutdown));
                            break;
                        }
                        Err(e) => println!("{}", ConsoleFormatter::error(&e)),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = rl.save_history(path);
        }

        // Releases anything still buffered, then closes the event stream
        if let Err(e) = self.handle.shutdown().await {
            debug!("Council already stopped: {}", e);
        }
        let _ = printer.await;
        println!("Bye!");
        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("{}", "=== Council ===".cyan().bold());
        let agents = self
            .registry
            .iter()
            .map(|a| {
                if self.registry.is_terminator(&a.id) {
                    format!("{} (terminator)", a.name)
                } else {
                    a.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("{} {}", "Agents:".cyan().bold(), agents);
        if let Ok(snapshot) = self.handle.snapshot().await {
            let fmt = ConsoleFormatter::new(&self.registry);
            println!("{}", fmt.snapshot(&snapshot));
        }
        println!("{}", "Type /help for commands.".dimmed());
        println!();
    }

    async fn execute(&self, command: OperatorCommand) -> Result<Flow, CouncilError> {
        let fmt = ConsoleFormatter::new(&self.registry);
        let handle = &self.handle;

        match command {
            OperatorCommand::Say(text) => handle.speak(text, None).await?,
            OperatorCommand::Convene(topic) => handle.convene(topic).await?,
            OperatorCommand::Preserve => {
                handle.preserve().await?;
            }
            OperatorCommand::Mode(mode) => handle.set_mode(mode).await?,
            OperatorCommand::Start {
                first_speaker,
                max_rounds,
            } => {
                let mode = handle.snapshot().await?.mode;
                if mode == CouncilMode::Arena {
                    handle.start_arena(first_speaker, max_rounds).await?;
                } else {
                    handle.start_chamber(first_speaker, max_rounds).await?;
                }
            }
            OperatorCommand::Summon(agent) => handle.summon(agent).await?,
            OperatorCommand::Stop => handle.stop().await?,
            OperatorCommand::Team(agent) => {
                let assignment = handle.assign_team_member(agent.clone()).await?;
                println!("{}", fmt.assignment(&agent, assignment));
            }
            OperatorCommand::ClearTeams => handle.clear_teams().await?,
            OperatorCommand::Focus(agent) => {
                handle.toggle_focus(agent).await?;
            }
            OperatorCommand::Hand(agent) => {
                if !handle.raise_hand(agent.clone()).await? {
                    println!("{}'s hand is already raised", agent);
                }
            }
            OperatorCommand::Lower(agent) => {
                if !handle.lower_hand(agent.clone()).await? {
                    println!("{}'s hand was not raised", agent);
                }
            }
            OperatorCommand::Floor => {
                handle.open_floor().await?;
            }
            OperatorCommand::Cancel => handle.cancel_floor().await?,
            OperatorCommand::Vote(vote) => match vote {
                VoteCommand::Open(question) => handle.open_vote(question).await?,
                VoteCommand::Cast { agent, choice } => {
                    handle.cast_vote(agent, choice).await?;
                }
                VoteCommand::Decide(choice) => {
                    handle.decide_vote(choice).await?;
                }
                VoteCommand::Accept => {
                    handle.accept_vote().await?;
                }
                VoteCommand::Reset => handle.reset_vote().await?,
            },
            OperatorCommand::Temporal(temporal) => match temporal {
                TemporalCommand::On => {
                    handle.set_temporal(true).await?;
                }
                TemporalCommand::Off => {
                    handle.set_temporal(false).await?;
                }
                TemporalCommand::Flush => {
                    let released = handle.flush_temporal().await?;
                    println!("Released {} buffered message(s)", released);
                }
            },
            OperatorCommand::Timer(Some(minutes)) => handle.start_timer(minutes).await?,
            OperatorCommand::Timer(None) => handle.clear_timer().await?,
            OperatorCommand::Commit { agent, text } => handle.commit(agent, text).await?,
            OperatorCommand::Status => {
                let snapshot = handle.snapshot().await?;
                println!("{}", fmt.snapshot(&snapshot));
            }
            OperatorCommand::Help => println!("{}", ConsoleFormatter::help()),
            OperatorCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

/// Print council events until the controller closes the stream.
fn spawn_event_printer(
    mut events: mpsc::UnboundedReceiver<CouncilEvent>,
    registry: Arc<AgentRegistry>,
    show_progress: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let fmt = ConsoleFormatter::new(&registry);
        let mut indicator = WaitIndicator::new(show_progress);

        while let Some(event) = events.recv().await {
            let Some(line) = fmt.event(&event) else {
                continue;
            };

            match &event {
                // Waits: the spinner carries the line when enabled
                CouncilEvent::TurnStarted { .. }
                | CouncilEvent::HandoffScheduled { .. }
                | CouncilEvent::FloorCountdown { .. }
                    if show_progress =>
                {
                    indicator.start(line.trim().to_string());
                }
                CouncilEvent::SessionEnded { .. }
                | CouncilEvent::SessionPaused { .. }
                | CouncilEvent::FloorClosed { .. }
                | CouncilEvent::FloorSpeakerDropped { .. } => {
                    indicator.clear();
                    println!("{}", line);
                }
                _ => indicator.println(&line),
            }
        }
        indicator.clear();
    })
}
