//! Council controller (Actor pattern)
//!
//! One controller task owns every piece of mutable state for one council:
//! the conversation record, the active mode, the Chamber/Arena session, the
//! Free Floor queue and the temporal release gate. Callers talk to it through
//! a [`CouncilHandle`]; commands are processed strictly one at a time, so
//! there are no lost updates against the store.
//!
//! Agent replies are generated on spawned tasks so a slow Agent Response
//! Service never blocks operator commands. Each dispatched turn carries a
//! ticket; a reply whose ticket no longer matches the in-flight turn (because
//! the session was stopped or the floor cancelled) is discarded.
//!
//! At most one timer is pending at any time: either a scheduled handoff or
//! the Free Floor countdown. Clearing it is the cancellation.

mod chamber;
mod floor;
mod handle;
mod record;
mod selection;
mod snapshot;
mod temporal;
mod vote;

#[cfg(test)]
mod tests;

pub use handle::CouncilHandle;
pub use snapshot::{CouncilSnapshot, SessionSnapshot};

use crate::config::CouncilConfig;
use crate::ports::agent_responder::{AgentResponder, ConversationContext, ResponderError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::conversation_store::ConversationStore;
use crate::ports::council_event::CouncilEvent;
use council_domain::util::current_timestamp;
use council_domain::{
    AgentId, AgentProfile, AgentRegistry, ArenaTeams, ChamberSession, ConversationRecord,
    CouncilError, CouncilMode, FocusSelection, FreeFloorQueue, Message, PhaseClock,
    TemporalRelease, TurnPlan,
};
use handle::CouncilCommand;
use serde_json::Value;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// The turn an in-flight reply belongs to.
enum Turn {
    Chamber(TurnPlan),
    Floor,
}

struct InFlight {
    ticket: u64,
    agent: AgentId,
    turn: Turn,
}

/// Result of one spawned `generate` call.
struct TurnCompletion {
    ticket: u64,
    result: Result<String, ResponderError>,
}

enum Scheduled {
    /// Chamber/Arena handoff to this agent
    Summon(AgentId),
    /// Invoke the next Free Floor speaker
    FloorAdvance,
}

struct Deadline {
    at: Instant,
    action: Scheduled,
}

/// Owns and drives one council.
pub struct CouncilController {
    config: CouncilConfig,
    registry: Arc<AgentRegistry>,
    responder: Arc<dyn AgentResponder>,
    store: Arc<dyn ConversationStore>,
    logger: Arc<dyn ConversationLogger>,
    events: mpsc::UnboundedSender<CouncilEvent>,

    record: ConversationRecord,
    mode: CouncilMode,
    session: Option<ChamberSession>,
    floor: FreeFloorQueue,
    focus: FocusSelection,
    teams: ArenaTeams,
    temporal: TemporalRelease,

    tasks: JoinSet<TurnCompletion>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    deadline: Option<Deadline>,
    started: Instant,
}

impl CouncilController {
    pub fn new(
        config: CouncilConfig,
        registry: Arc<AgentRegistry>,
        responder: Arc<dyn AgentResponder>,
        store: Arc<dyn ConversationStore>,
        logger: Arc<dyn ConversationLogger>,
        events: mpsc::UnboundedSender<CouncilEvent>,
    ) -> Self {
        let timing = config.timing();
        let temporal = TemporalRelease::new(
            PhaseClock::new(0, timing.temporal_period_ms),
            timing.release_delay,
        );

        Self {
            config,
            registry,
            responder,
            store,
            logger,
            events,
            record: ConversationRecord::default(),
            mode: CouncilMode::default(),
            session: None,
            floor: FreeFloorQueue::default(),
            focus: FocusSelection::default(),
            teams: ArenaTeams::default(),
            temporal,
            tasks: JoinSet::new(),
            in_flight: None,
            next_ticket: 0,
            deadline: None,
            started: Instant::now(),
        }
    }

    /// Load the stored record and start the controller task.
    pub async fn spawn(mut self) -> Result<CouncilHandle, CouncilError> {
        self.record = self.store.get(self.config.council_id()).await?;
        if self.record.topic.is_empty()
            && let Some(topic) = self.config.default_topic()
        {
            self.record.topic = topic.to_string();
        }
        self.started = Instant::now();

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(self.run(rx));
        Ok(CouncilHandle::new(tx))
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<CouncilCommand>) {
        let mut tick = time::interval(self.config.timing().temporal_tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            council = %self.config.council_id(),
            agents = self.registry.len(),
            messages = self.record.messages.len(),
            "Council controller started"
        );

        loop {
            let deadline = self.deadline.as_ref().map(|d| d.at);

            tokio::select! {
                biased;

                // Agent replies
                Some(res) = self.tasks.join_next() => {
                    match res {
                        Ok(completion) => self.on_completion(completion).await,
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => self.on_task_panic(e.to_string()).await,
                    }
                }

                // Operator commands
                cmd = commands.recv() => {
                    let Some(cmd) = cmd else {
                        break; // every handle dropped
                    };
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }

                // Handoff delay / floor countdown
                _ = sleep_until(deadline), if deadline.is_some() => {
                    self.on_deadline();
                }

                // Temporal release
                _ = tick.tick(), if self.temporal.is_enabled() => {
                    self.release_due();
                }
            }
        }

        let stranded = self.temporal.flush();
        self.release_entries(stranded);
        self.tasks.abort_all();
        info!(council = %self.config.council_id(), "Council controller stopped");
    }

    async fn handle_command(&mut self, cmd: CouncilCommand) -> ControlFlow<()> {
        match cmd {
            CouncilCommand::Convene { topic, reply } => {
                let _ = reply.send(self.convene(topic).await);
            }
            CouncilCommand::Preserve { reply } => {
                let _ = reply.send(self.preserve().await);
            }
            CouncilCommand::Speak {
                content,
                image,
                reply,
            } => {
                let _ = reply.send(self.speak(content, image).await);
            }
            CouncilCommand::SetMode { mode, reply } => {
                let _ = reply.send(self.set_mode(mode));
            }
            CouncilCommand::StartSession {
                kind,
                first_speaker,
                max_rounds,
                reply,
            } => {
                let _ = reply.send(self.start_session(kind, &first_speaker, max_rounds));
            }
            CouncilCommand::Summon { agent, reply } => {
                let _ = reply.send(self.summon(&agent));
            }
            CouncilCommand::Stop { reply } => {
                let _ = reply.send(self.stop_session());
            }
            CouncilCommand::AssignTeam { agent, reply } => {
                let _ = reply.send(self.assign_team_member(&agent));
            }
            CouncilCommand::ClearTeams { reply } => {
                let _ = reply.send(self.clear_teams());
            }
            CouncilCommand::ToggleFocus { agent, reply } => {
                let _ = reply.send(self.toggle_focus(&agent));
            }
            CouncilCommand::RaiseHand { agent, reply } => {
                let _ = reply.send(self.raise_hand(&agent).await);
            }
            CouncilCommand::LowerHand { agent, reply } => {
                let _ = reply.send(self.lower_hand(&agent).await);
            }
            CouncilCommand::OpenFloor { reply } => {
                let _ = reply.send(self.open_floor().await);
            }
            CouncilCommand::CancelFloor { reply } => {
                self.cancel_floor();
                let _ = reply.send(Ok(()));
            }
            CouncilCommand::OpenVote { question, reply } => {
                let _ = reply.send(self.open_vote(question).await);
            }
            CouncilCommand::CastVote {
                agent,
                choice,
                reply,
            } => {
                let _ = reply.send(self.cast_vote(&agent, choice).await);
            }
            CouncilCommand::DecideVote { choice, reply } => {
                let _ = reply.send(self.decide_vote(choice).await);
            }
            CouncilCommand::AcceptVote { reply } => {
                let _ = reply.send(self.accept_vote().await);
            }
            CouncilCommand::ResetVote { reply } => {
                let _ = reply.send(self.reset_vote().await);
            }
            CouncilCommand::SetTemporal { enabled, reply } => {
                let _ = reply.send(Ok(self.set_temporal(enabled)));
            }
            CouncilCommand::FlushTemporal { reply } => {
                let _ = reply.send(Ok(self.flush_temporal()));
            }
            CouncilCommand::StartTimer { minutes, reply } => {
                let _ = reply.send(self.start_timer(minutes).await);
            }
            CouncilCommand::ClearTimer { reply } => {
                let _ = reply.send(self.clear_timer().await);
            }
            CouncilCommand::Commit { agent, text, reply } => {
                let _ = reply.send(self.commit(&agent, text).await);
            }
            CouncilCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(self.snapshot()));
            }
            CouncilCommand::Shutdown { reply } => {
                let _ = reply.send(Ok(()));
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    // ==================== Turn dispatch ====================

    /// Spawn a `generate` call for `profile` and mark it in flight.
    fn dispatch(&mut self, profile: AgentProfile, turn: Turn) {
        let (round, forced) = match &turn {
            Turn::Chamber(plan) => (Some(plan.round), plan.forced),
            Turn::Floor => (None, false),
        };
        let context = ConversationContext {
            council_id: self.config.council_id().to_string(),
            topic: self.record.topic.clone(),
            mode: self.mode,
            round,
            messages: self.record.messages.clone(),
        };

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let agent = profile.id.clone();
        let responder = Arc::clone(&self.responder);
        self.tasks.spawn(async move {
            let result = responder.generate(&profile, &context).await;
            TurnCompletion { ticket, result }
        });

        debug!(agent = %agent, ?round, forced, ticket, "Agent summoned");
        self.emit(CouncilEvent::TurnStarted {
            agent: agent.clone(),
            round,
            forced,
        });
        self.in_flight = Some(InFlight {
            ticket,
            agent,
            turn,
        });
    }

    async fn on_completion(&mut self, completion: TurnCompletion) {
        let Some(in_flight) = self
            .in_flight
            .take_if(|f| f.ticket == completion.ticket)
        else {
            debug!(ticket = completion.ticket, "Discarding reply for a cancelled turn");
            return;
        };

        match in_flight.turn {
            Turn::Chamber(plan) => {
                self.finish_chamber_turn(in_flight.agent, plan, completion.result)
                    .await
            }
            Turn::Floor => {
                self.finish_floor_turn(in_flight.agent, completion.result)
                    .await
            }
        }
    }

    /// A `generate` task panicked. If nothing else is outstanding it was the
    /// in-flight turn, which is then treated as a failed reply.
    async fn on_task_panic(&mut self, error: String) {
        warn!(error = %error, "Agent task panicked");
        if self.tasks.is_empty()
            && let Some(in_flight) = &self.in_flight
        {
            let ticket = in_flight.ticket;
            let completion = TurnCompletion {
                ticket,
                result: Err(ResponderError::Other(format!("task panicked: {}", error))),
            };
            self.on_completion(completion).await;
        }
    }

    fn on_deadline(&mut self) {
        let Some(deadline) = self.deadline.take() else {
            return;
        };
        match deadline.action {
            Scheduled::Summon(next) => self.summon_scheduled(next),
            Scheduled::FloorAdvance => self.advance_floor(),
        }
    }

    fn schedule(&mut self, delay: std::time::Duration, action: Scheduled) {
        self.deadline = Some(Deadline {
            at: Instant::now() + delay,
            action,
        });
    }

    // ==================== Messages ====================

    /// Append to the canonical log, then route through the temporal gate.
    ///
    /// The in-memory record is authoritative; a failed store write is
    /// reported and healed by the next full `put`.
    async fn append_message(&mut self, message: Message) {
        self.record.append(message.clone());
        if let Err(e) = self
            .store
            .append_message(self.config.council_id(), &message)
            .await
        {
            self.warn(format!("Failed to store message: {}", e));
        }

        self.transcript(
            "message_appended",
            serde_json::json!({
                "speaker": message.speaker_name,
                "agent_id": message.agent_id().map(|id| id.as_str()),
                "content": message.content,
                "timestamp": message.timestamp,
            }),
        );
        self.emit(CouncilEvent::MessageAppended {
            message: message.clone(),
        });
        self.route_release(message);
    }

    // ==================== Helpers ====================

    async fn persist(&self) -> Result<(), CouncilError> {
        self.store
            .put(self.config.council_id(), &self.record)
            .await
            .map_err(CouncilError::from)
    }

    /// Write `record` and adopt it. A failed write leaves the in-memory record as it was.
    async fn commit_record(&mut self, record: ConversationRecord) -> Result<(), CouncilError> {
        self.store.put(self.config.council_id(), &record).await?;
        self.record = record;
        Ok(())
    }

    /// Resolve an agent reference (id or display name) to an active agent.
    fn resolve_agent(&self, reference: &str) -> Result<AgentId, CouncilError> {
        self.registry
            .resolve(reference)
            .map(|p| p.id.clone())
            .ok_or_else(|| {
                CouncilError::not_found(format!("{} is not an active agent", reference.trim()))
            })
    }

    fn session_running(&self) -> bool {
        self.session.as_ref().is_some_and(ChamberSession::is_running)
    }

    /// Milliseconds since the controller started; drives the phase clock.
    fn clock_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn now(&self) -> u64 {
        current_timestamp()
    }

    fn emit(&self, event: CouncilEvent) {
        let _ = self.events.send(event);
    }

    fn warn(&self, message: String) {
        warn!("{}", message);
        self.emit(CouncilEvent::Warning { message });
    }

    fn transcript(&self, event_type: &'static str, payload: Value) {
        self.logger.log(ConversationEvent::new(event_type, payload));
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
