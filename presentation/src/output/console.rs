//! Console rendering for council events and status

use crate::repl::command::COMMANDS;
use colored::Colorize;
use council_application::{CouncilEvent, CouncilSnapshot, SessionEndReason};
use council_domain::{
    AgentId, AgentRegistry, Assignment, CouncilError, Message, PauseReason, Resolution, Speaker,
};
use std::time::Duration;

/// Formats council output for the terminal.
///
/// Agent ids are shown by display name when the registry knows them.
pub struct ConsoleFormatter<'a> {
    registry: &'a AgentRegistry,
}

impl<'a> ConsoleFormatter<'a> {
    pub fn new(registry: &'a AgentRegistry) -> Self {
        Self { registry }
    }

    fn name(&self, agent: &AgentId) -> String {
        self.registry
            .get(agent)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| agent.to_string())
    }

    fn names(&self, agents: &[AgentId]) -> String {
        if agents.is_empty() {
            return "(none)".to_string();
        }
        agents
            .iter()
            .map(|a| self.name(a))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render one event, or `None` for events the console does not show.
    pub fn event(&self, event: &CouncilEvent) -> Option<String> {
        let line = match event {
            // Appends are shown when released to the audience
            CouncilEvent::MessageAppended { .. } => return None,
            CouncilEvent::MessageReleased { message, voice } => {
                self.message(message, voice.as_deref())
            }

            CouncilEvent::SessionStarted {
                kind,
                first_speaker,
                max_rounds,
            } => format!(
                "{} {} session started: {} opens, up to {} rounds",
                "::".cyan(),
                kind,
                self.name(first_speaker).bold(),
                max_rounds
            ),
            CouncilEvent::TurnStarted {
                agent,
                round,
                forced,
            } => {
                let round = match round {
                    Some(r) => format!("round {}", r),
                    None => "floor".to_string(),
                };
                let forced = if *forced { " (closing synthesis)" } else { "" };
                format!(
                    "{}",
                    format!("   {} is speaking [{}]{}", self.name(agent), round, forced).dimmed()
                )
            }
            CouncilEvent::ConclusionIgnored { agent } => format!(
                "{} {} tried to conclude; only the terminator may",
                "!".yellow(),
                self.name(agent)
            ),
            CouncilEvent::HandoffScheduled { next, delay } => format!(
                "{}",
                format!("   handing off to {} in {}", self.name(next), secs(*delay)).dimmed()
            ),
            CouncilEvent::SessionPaused { reason } => {
                format!("{} Session paused: {}", "||".yellow().bold(), self.pause(reason))
            }
            CouncilEvent::SessionEnded { reason } => {
                let reason = match reason {
                    SessionEndReason::Concluded { by } => format!("concluded by {}", self.name(by)),
                    SessionEndReason::RoundLimit { speaker } => {
                        format!("round limit reached, synthesis by {}", self.name(speaker))
                    }
                    SessionEndReason::Stopped => "stopped".to_string(),
                };
                format!("{} Session ended: {}", "::".cyan(), reason)
            }

            CouncilEvent::FloorOpened { queue } => {
                format!("{} Floor open: {}", "::".cyan(), self.names(queue))
            }
            CouncilEvent::FloorCountdown { next, delay } => format!(
                "{}",
                format!("   {} speaks in {}", self.name(next), secs(*delay)).dimmed()
            ),
            CouncilEvent::FloorSpeakerDropped { agent, error } => format!(
                "{} {} dropped from the floor: {}",
                "x".red(),
                self.name(agent),
                error
            ),
            CouncilEvent::FloorClosed { exhausted } => {
                let why = if *exhausted { "everyone has spoken" } else { "cancelled" };
                format!("{} Floor closed ({})", "::".cyan(), why)
            }

            CouncilEvent::VoteOpened { question } => {
                format!("{} Vote: {}", "?".cyan().bold(), question.bold())
            }
            CouncilEvent::VoteTallied { agent, yes, no } => format!(
                "   {} voted ({} yes / {} no)",
                self.name(agent),
                yes.to_string().green(),
                no.to_string().red()
            ),
            CouncilEvent::VoteClosed {
                question,
                outcome,
                resolution,
            } => {
                let by = match resolution {
                    Resolution::Tally => "by tally",
                    Resolution::OperatorDecision => "by operator decision",
                };
                format!(
                    "{} Vote closed: {} -> {} ({})",
                    "?".cyan().bold(),
                    question,
                    outcome.to_string().to_uppercase().bold(),
                    by
                )
            }
            CouncilEvent::VoteReset => format!("{} Vote discarded", "?".cyan()),

            CouncilEvent::ModeChanged { mode, board } => {
                let board = board
                    .map(|b| format!(" (board: {:?})", b).to_lowercase())
                    .unwrap_or_default();
                format!(
                    "{} Mode: {}{} - {}",
                    "::".cyan(),
                    mode.to_string().bold(),
                    board,
                    mode.description()
                )
            }
            CouncilEvent::TeamsChanged { teams } => format!(
                "   Alpha: {} | Omega: {}",
                self.names(teams.alpha()),
                self.names(teams.omega())
            ),
            CouncilEvent::FocusChanged { selected } => {
                format!("   Focus: {}", self.names(selected))
            }

            CouncilEvent::TemporalToggled { enabled, flushed } => {
                if *enabled {
                    format!("{} Temporal release on", "~".magenta())
                } else {
                    format!(
                        "{} Temporal release off ({} released)",
                        "~".magenta(),
                        flushed
                    )
                }
            }
            CouncilEvent::MessageDeferred { agent, delay } => format!(
                "{}",
                format!("   {} resonates... ({})", self.name(agent), secs(*delay)).dimmed()
            ),

            CouncilEvent::Convened { topic } => {
                format!("{} Council convened: {}", "::".cyan(), topic.bold())
            }
            CouncilEvent::Preserved { archive } => {
                format!("{} Conversation preserved as {}", "::".cyan(), archive)
            }
            CouncilEvent::HandRaised { agent } => {
                format!("   {} raised a hand", self.name(agent))
            }
            CouncilEvent::HandLowered { agent } => {
                format!("   {} lowered a hand", self.name(agent))
            }
            CouncilEvent::TimerChanged { minutes } => match minutes {
                Some(m) => format!("{} Timer set for {} min", "::".cyan(), m),
                None => format!("{} Timer cleared", "::".cyan()),
            },
            CouncilEvent::Committed { agent, text } => {
                format!("   {} commits: {}", self.name(agent).bold(), text)
            }

            CouncilEvent::Warning { message } => format!("{} {}", "warning:".yellow(), message),
        };
        Some(line)
    }

    fn message(&self, message: &Message, voice: Option<&str>) -> String {
        let speaker = match &message.speaker {
            Speaker::Operator => message.speaker_name.green().bold(),
            Speaker::Agent(_) => message.speaker_name.yellow().bold(),
        };
        let voice = voice
            .map(|v| format!(" {}", format!("[{}]", v).dimmed()))
            .unwrap_or_default();

        let mut out = format!("\n{}{}\n{}", speaker, voice, message.content);
        if let Some(image) = &message.image {
            out.push_str(&format!("\n{} {}", "image:".dimmed(), image));
        }
        out
    }

    fn pause(&self, reason: &PauseReason) -> String {
        match reason {
            PauseReason::NoValidNextSpeaker { requested: Some(name) } => format!(
                "no valid next speaker (asked for \"{}\"); /summon to continue",
                name
            ),
            PauseReason::NoValidNextSpeaker { requested: None } => {
                "no handoff in the reply; /summon to continue".to_string()
            }
            PauseReason::ResponseFailed { agent, error } => format!(
                "{} failed to respond ({}); /summon to retry",
                self.name(agent),
                error
            ),
        }
    }

    pub fn assignment(&self, agent: &str, assignment: Assignment) -> String {
        match assignment {
            Assignment::Joined(team) => format!("{} joins {}", agent, team),
            Assignment::Removed(team) => format!("{} leaves {}", agent, team),
            Assignment::Full => "Both teams are full".to_string(),
        }
    }

    /// Multi-line `/status` report.
    pub fn snapshot(&self, snapshot: &CouncilSnapshot) -> String {
        let mut out = String::new();
        let line = "-".repeat(40);

        out.push_str(&format!("{}\n", line.cyan()));
        out.push_str(&format!("{} {}\n", "Council:".cyan().bold(), snapshot.council_id));
        let topic = if snapshot.topic.is_empty() {
            "(not convened)"
        } else {
            snapshot.topic.as_str()
        };
        out.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), topic));
        out.push_str(&format!(
            "{} {}  {} {}\n",
            "Mode:".cyan().bold(),
            snapshot.mode,
            "Messages:".cyan().bold(),
            snapshot.message_count
        ));

        if let Some(session) = &snapshot.session {
            let state = match (&session.paused, session.running) {
                (Some(reason), _) => format!("paused - {}", self.pause(reason)),
                (None, true) => "running".to_string(),
                (None, false) => "idle".to_string(),
            };
            out.push_str(&format!(
                "{} {} round {}/{}, opened by {} ({})\n",
                "Session:".cyan().bold(),
                session.kind,
                session.round,
                session.max_rounds,
                self.name(&session.first_speaker),
                state
            ));
        }
        if let Some(agent) = &snapshot.speaking {
            out.push_str(&format!("{} {}\n", "Speaking:".cyan().bold(), self.name(agent)));
        }
        if snapshot.floor_active {
            out.push_str(&format!(
                "{} {}\n",
                "Floor queue:".cyan().bold(),
                self.names(&snapshot.floor_queue)
            ));
        }
        if !snapshot.raised_hands.is_empty() {
            out.push_str(&format!(
                "{} {}\n",
                "Hands:".cyan().bold(),
                self.names(&snapshot.raised_hands)
            ));
        }
        if !snapshot.teams.is_empty() {
            out.push_str(&format!(
                "{} Alpha: {} | Omega: {}\n",
                "Teams:".cyan().bold(),
                self.names(snapshot.teams.alpha()),
                self.names(snapshot.teams.omega())
            ));
        }
        if !snapshot.focus.is_empty() {
            out.push_str(&format!("{} {}\n", "Focus:".cyan().bold(), self.names(&snapshot.focus)));
        }
        if let Some(vote) = &snapshot.vote {
            let status = match vote.outcome {
                Some(outcome) => format!("closed: {}", outcome),
                None => "open".to_string(),
            };
            out.push_str(&format!(
                "{} {} ({}, {})\n",
                "Vote:".cyan().bold(),
                vote.question,
                vote.tally_summary(),
                status
            ));
        }
        out.push_str(&format!(
            "{} {} ({} buffered)\n",
            "Temporal:".cyan().bold(),
            if snapshot.temporal_enabled { "on" } else { "off" },
            snapshot.temporal_pending
        ));
        if let Some(remaining) = snapshot.timer_remaining_ms {
            let secs = remaining / 1000;
            out.push_str(&format!(
                "{} {}:{:02} left\n",
                "Timer:".cyan().bold(),
                secs / 60,
                secs % 60
            ));
        }
        if snapshot.commitments > 0 {
            out.push_str(&format!(
                "{} {}\n",
                "Commitments:".cyan().bold(),
                snapshot.commitments
            ));
        }
        out.push_str(&format!("{}", line.cyan()));
        out
    }

    pub fn error(err: &CouncilError) -> String {
        format!("{} {}", "Error:".red().bold(), err)
    }

    pub fn help() -> String {
        let mut out = format!("\n{}\n", "Commands:".cyan().bold());
        for (usage, description) in COMMANDS {
            out.push_str(&format!("  {:<28} {}\n", usage, description.dimmed()));
        }
        out.push_str(&format!("\n{}\n", "Anything else is spoken as the operator.".dimmed()));
        out
    }
}

fn secs(delay: Duration) -> String {
    format!("{:.1}s", delay.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::SessionSnapshot;
    use council_domain::{AgentProfile, ArenaTeams, CouncilMode, SessionKind};

    fn registry() -> AgentRegistry {
        AgentRegistry::new(
            vec![
                AgentProfile::new("wisdom", "Wisdom", 1),
                AgentProfile::new("aster", "Aster", 2),
            ],
            Some(AgentId::new("wisdom")),
        )
        .unwrap()
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_released_message_shows_speaker_and_voice() {
        plain();
        let registry = registry();
        let fmt = ConsoleFormatter::new(&registry);
        let event = CouncilEvent::MessageReleased {
            message: Message::from_agent(AgentId::new("aster"), "Aster", "Tides first.", 1),
            voice: Some("alto".to_string()),
        };

        let out = fmt.event(&event).unwrap();
        assert!(out.contains("Aster [alto]"));
        assert!(out.contains("Tides first."));
    }

    #[test]
    fn test_appended_messages_are_not_rendered() {
        let registry = registry();
        let fmt = ConsoleFormatter::new(&registry);
        let event = CouncilEvent::MessageAppended {
            message: Message::from_operator("hello", 1),
        };
        assert!(fmt.event(&event).is_none());
    }

    #[test]
    fn test_agents_are_named_by_display_name() {
        plain();
        let registry = registry();
        let fmt = ConsoleFormatter::new(&registry);

        let out = fmt
            .event(&CouncilEvent::HandoffScheduled {
                next: AgentId::new("wisdom"),
                delay: Duration::from_millis(1500),
            })
            .unwrap();
        assert!(out.contains("handing off to Wisdom in 1.5s"));

        let out = fmt
            .event(&CouncilEvent::SessionEnded {
                reason: SessionEndReason::Concluded {
                    by: AgentId::new("wisdom"),
                },
            })
            .unwrap();
        assert!(out.contains("concluded by Wisdom"));

        // Unknown ids fall back to the raw id
        let out = fmt
            .event(&CouncilEvent::HandRaised {
                agent: AgentId::new("ghost"),
            })
            .unwrap();
        assert!(out.contains("ghost raised a hand"));
    }

    #[test]
    fn test_pause_suggests_summon() {
        plain();
        let registry = registry();
        let fmt = ConsoleFormatter::new(&registry);
        let out = fmt
            .event(&CouncilEvent::SessionPaused {
                reason: PauseReason::NoValidNextSpeaker {
                    requested: Some("Zephyr".to_string()),
                },
            })
            .unwrap();
        assert!(out.contains("Zephyr"));
        assert!(out.contains("/summon"));
    }

    #[test]
    fn test_snapshot_report() {
        plain();
        let registry = registry();
        let fmt = ConsoleFormatter::new(&registry);
        let snapshot = CouncilSnapshot {
            council_id: "main".to_string(),
            topic: "Harbor".to_string(),
            mode: CouncilMode::Chamber,
            message_count: 4,
            session: Some(SessionSnapshot {
                kind: SessionKind::Chamber,
                round: 3,
                max_rounds: 32,
                first_speaker: AgentId::new("wisdom"),
                running: true,
                paused: None,
            }),
            speaking: Some(AgentId::new("aster")),
            floor_active: false,
            floor_queue: Vec::new(),
            raised_hands: vec![AgentId::new("aster")],
            vote: None,
            temporal_enabled: true,
            temporal_pending: 2,
            teams: ArenaTeams::default(),
            focus: Vec::new(),
            timer_remaining_ms: Some(125_000),
            commitments: 0,
        };

        let out = fmt.snapshot(&snapshot);
        assert!(out.contains("Topic: Harbor"));
        assert!(out.contains("round 3/32, opened by Wisdom (running)"));
        assert!(out.contains("Speaking: Aster"));
        assert!(out.contains("Hands: Aster"));
        assert!(out.contains("on (2 buffered)"));
        assert!(out.contains("2:05 left"));
        assert!(!out.contains("Vote:"));
    }

    #[test]
    fn test_help_covers_commands() {
        plain();
        let help = ConsoleFormatter::help();
        assert!(help.contains("/vote cast <agent> yes|no"));
        assert!(help.contains("/temporal on|off|flush"));
    }
}
