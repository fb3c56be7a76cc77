//! Chamber / Arena session commands and turn completion.

use super::{CouncilController, Scheduled, Turn};
use crate::ports::agent_responder::ResponderError;
use crate::ports::council_event::{CouncilEvent, SessionEndReason};
use council_domain::{
    AgentId, ChamberSession, CouncilError, CouncilMode, Message, SessionKind, TurnOutcome,
    TurnPlan,
};
use council_domain::util::truncate_str;
use tracing::{debug, info, warn};

impl CouncilController {
    /// Start a Chamber or Arena session and summon the first speaker.
    pub(super) fn start_session(
        &mut self,
        kind: SessionKind,
        first_speaker: &str,
        max_rounds: Option<u32>,
    ) -> Result<(), CouncilError> {
        let required = match kind {
            SessionKind::Chamber => CouncilMode::Chamber,
            SessionKind::Arena => CouncilMode::Arena,
        };
        if self.mode != required {
            return Err(CouncilError::validation(format!(
                "a {} session requires {} mode (current mode: {})",
                kind, required, self.mode
            )));
        }
        if self.session_running() {
            return Err(CouncilError::conflict("a session is already running"));
        }
        if first_speaker.trim().is_empty() {
            return Err(CouncilError::validation("first speaker is not set"));
        }

        let first = self
            .registry
            .resolve(first_speaker)
            .map(|p| p.id.clone())
            .ok_or_else(|| {
                CouncilError::validation(format!(
                    "first speaker {} is not an active agent",
                    first_speaker.trim()
                ))
            })?;
        let max_rounds = max_rounds.unwrap_or(self.config.max_rounds());

        let session = match kind {
            SessionKind::Chamber => ChamberSession::chamber(first.clone(), max_rounds, &self.registry)?,
            SessionKind::Arena => {
                ChamberSession::arena(first.clone(), max_rounds, self.teams.clone(), &self.registry)?
            }
        };

        info!(kind = %kind, first_speaker = %first, max_rounds, "Session started");
        self.transcript(
            "session_started",
            serde_json::json!({
                "kind": kind.to_string(),
                "first_speaker": first.as_str(),
                "max_rounds": max_rounds,
            }),
        );
        self.emit(CouncilEvent::SessionStarted {
            kind,
            first_speaker: first.clone(),
            max_rounds,
        });

        self.session = Some(session);
        self.begin_chamber_turn(first)
    }

    /// Operator summon. Re-arms a paused session.
    pub(super) fn summon(&mut self, reference: &str) -> Result<(), CouncilError> {
        let Some(session) = self.session.as_ref() else {
            return Err(CouncilError::precondition("no session to summon into"));
        };
        if let Some(in_flight) = &self.in_flight {
            return Err(CouncilError::conflict(format!(
                "{} is still speaking",
                in_flight.agent
            )));
        }
        if self.deadline.is_some() {
            return Err(CouncilError::conflict("a handoff is already scheduled"));
        }

        let target = self.resolve_agent(reference)?;
        if !session.accepts_speaker(&target, &self.registry) {
            return Err(CouncilError::not_found(format!(
                "{} is not on an Arena team",
                target
            )));
        }

        if let Some(session) = self.session.as_mut()
            && !session.is_running()
        {
            session.resume();
            info!(agent = %target, "Session resumed by operator");
        }
        self.begin_chamber_turn(target)
    }

    /// Stop the session. A scheduled handoff is cancelled and a reply still in
    /// flight will be discarded when it arrives.
    pub(super) fn stop_session(&mut self) -> Result<(), CouncilError> {
        if self.session.is_none() {
            return Err(CouncilError::precondition("no session to stop"));
        }

        self.deadline = None;
        if let Some(in_flight) = self.in_flight.take() {
            info!(agent = %in_flight.agent, "Session stopped with a reply in flight");
        }
        self.end_session(SessionEndReason::Stopped);
        Ok(())
    }

    /// Fired by the handoff timer.
    pub(super) fn summon_scheduled(&mut self, next: AgentId) {
        if let Err(e) = self.begin_chamber_turn(next) {
            self.warn(format!("Scheduled handoff dropped: {}", e));
        }
    }

    fn begin_chamber_turn(&mut self, requested: AgentId) -> Result<(), CouncilError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| CouncilError::precondition("no active session"))?;
        let plan = session.begin_turn(requested)?;
        let profile = self.registry.require(&plan.speaker)?.clone();

        if plan.forced {
            info!(agent = %plan.speaker, round = plan.round, "Round cap reached, forcing synthesis turn");
        }
        self.dispatch(profile, Turn::Chamber(plan));
        Ok(())
    }

    pub(super) async fn finish_chamber_turn(
        &mut self,
        agent: AgentId,
        plan: TurnPlan,
        result: Result<String, ResponderError>,
    ) {
        let text = match result {
            Ok(text) => text,
            Err(err) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let reason = session.fail_turn(&plan, err.to_string());
                warn!(agent = %agent, round = plan.round, error = %err, "Turn failed, session paused");
                self.transcript(
                    "turn_failed",
                    serde_json::json!({
                        "agent_id": agent.as_str(),
                        "round": plan.round,
                        "error": err.to_string(),
                    }),
                );
                self.emit(CouncilEvent::SessionPaused { reason });
                return;
            }
        };

        debug!(agent = %agent, round = plan.round, reply = truncate_str(&text, 80), "Reply received");
        let name = self
            .registry
            .get(&agent)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| agent.to_string());
        self.append_message(Message::from_agent(agent.clone(), name, text.clone(), self.now()))
            .await;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let report = session.complete_turn(&plan, &text, &self.registry);

        if report.ignored_conclusion {
            info!(agent = %agent, "Conclusion from non-terminator ignored");
            self.emit(CouncilEvent::ConclusionIgnored {
                agent: agent.clone(),
            });
        }

        match report.outcome {
            TurnOutcome::Handoff(next) => {
                let delay = self.config.timing().handoff_delay;
                info!(from = %agent, to = %next, delay_ms = delay.as_millis() as u64, "Handoff scheduled");
                self.schedule(delay, Scheduled::Summon(next.clone()));
                self.emit(CouncilEvent::HandoffScheduled { next, delay });
            }
            TurnOutcome::Concluded => self.end_session(SessionEndReason::Concluded { by: agent }),
            TurnOutcome::ForcedEnd => {
                self.end_session(SessionEndReason::RoundLimit { speaker: agent })
            }
            TurnOutcome::Paused(reason) => {
                info!(agent = %agent, error = %reason.to_error(), "Session paused");
                self.emit(CouncilEvent::SessionPaused { reason });
            }
        }
    }

    pub(super) fn end_session(&mut self, reason: SessionEndReason) {
        let round = self.session.take().map(|s| s.round()).unwrap_or_default();
        let label = match &reason {
            SessionEndReason::Concluded { .. } => "concluded",
            SessionEndReason::RoundLimit { .. } => "round_limit",
            SessionEndReason::Stopped => "stopped",
        };

        info!(reason = label, round, "Session ended");
        self.transcript(
            "session_ended",
            serde_json::json!({ "reason": label, "round": round }),
        );
        self.emit(CouncilEvent::SessionEnded { reason });
    }
}
