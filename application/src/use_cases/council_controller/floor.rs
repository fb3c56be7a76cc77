//! Free Floor: queued speakers with a countdown between turns.

use super::{CouncilController, Scheduled, Turn};
use crate::ports::agent_responder::ResponderError;
use crate::ports::council_event::CouncilEvent;
use council_domain::{AgentId, CouncilError, FreeFloorQueue, Message};
use tracing::{info, warn};

impl CouncilController {
    /// Snapshot raised hands into the queue and invoke the first speaker.
    pub(super) async fn open_floor(&mut self) -> Result<Vec<AgentId>, CouncilError> {
        if !self.mode.allows_free_floor() {
            return Err(CouncilError::conflict(format!(
                "the Free Floor is not available in {} mode",
                self.mode
            )));
        }
        if self.floor.is_active() {
            return Err(CouncilError::conflict("the floor is already open"));
        }
        if let Some(in_flight) = &self.in_flight {
            return Err(CouncilError::conflict(format!(
                "{} is still speaking",
                in_flight.agent
            )));
        }

        self.floor = FreeFloorQueue::open(self.record.raised_hands.clone())?;
        self.record.take_raised_hands();
        let queue: Vec<AgentId> = self.floor.remaining().cloned().collect();

        if let Err(e) = self.persist().await {
            self.warn(format!("Failed to store raised hands: {}", e));
        }

        info!(speakers = queue.len(), "Free Floor opened");
        self.emit(CouncilEvent::FloorOpened {
            queue: queue.clone(),
        });
        self.advance_floor();
        Ok(queue)
    }

    /// Clear the queue and any pending countdown. Safe to call at any time.
    pub(super) fn cancel_floor(&mut self) {
        let was_active = self.floor.is_active();
        self.floor.cancel();

        if matches!(
            self.deadline.as_ref().map(|d| &d.action),
            Some(Scheduled::FloorAdvance)
        ) {
            self.deadline = None;
        }
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| matches!(f.turn, Turn::Floor))
        {
            self.in_flight = None;
        }

        if was_active {
            info!("Free Floor cancelled");
            self.emit(CouncilEvent::FloorClosed { exhausted: false });
        }
    }

    /// Invoke the queue head, or close the floor if the queue is empty.
    pub(super) fn advance_floor(&mut self) {
        loop {
            let Some(agent) = self.floor.head().cloned() else {
                self.close_exhausted_floor();
                return;
            };
            if let Some(profile) = self.registry.get(&agent).cloned() {
                self.dispatch(profile, Turn::Floor);
                return;
            }
            self.floor.pop_head();
            self.drop_floor_speaker(agent, "not an active agent".to_string());
        }
    }

    pub(super) async fn finish_floor_turn(
        &mut self,
        agent: AgentId,
        result: Result<String, ResponderError>,
    ) {
        match result {
            Ok(text) => {
                let name = self
                    .registry
                    .get(&agent)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| agent.to_string());
                self.append_message(Message::from_agent(agent, name, text, self.now()))
                    .await;
                self.floor.pop_head();

                match self.floor.head().cloned() {
                    Some(next) => {
                        let delay = self.config.timing().floor_countdown;
                        self.schedule(delay, Scheduled::FloorAdvance);
                        self.emit(CouncilEvent::FloorCountdown { next, delay });
                    }
                    None => self.close_exhausted_floor(),
                }
            }
            Err(err) => {
                // No retry: drop the speaker and move straight on
                self.floor.pop_head();
                self.drop_floor_speaker(agent, err.to_string());
                self.advance_floor();
            }
        }
    }

    fn drop_floor_speaker(&mut self, agent: AgentId, error: String) {
        warn!(agent = %agent, error = %error, "Dropped from the Free Floor");
        self.transcript(
            "floor_dropped",
            serde_json::json!({ "agent_id": agent.as_str(), "error": error }),
        );
        self.emit(CouncilEvent::FloorSpeakerDropped { agent, error });
    }

    fn close_exhausted_floor(&mut self) {
        self.floor.cancel();
        info!("Free Floor finished");
        self.emit(CouncilEvent::FloorClosed { exhausted: true });
    }
}
