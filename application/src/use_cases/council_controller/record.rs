//! Conversation record commands: convene, preserve, operator messages,
//! raised hands, the meeting timer and commitments.

use super::CouncilController;
use crate::ports::council_event::{CouncilEvent, SessionEndReason};
use council_domain::{ConversationRecord, CouncilError, Message};
use tracing::info;

impl CouncilController {
    /// Start a fresh record under `topic`.
    pub(super) async fn convene(&mut self, topic: String) -> Result<(), CouncilError> {
        let topic = topic.trim().to_string();
        if topic.is_empty() {
            return Err(CouncilError::validation("topic cannot be empty"));
        }
        self.ensure_idle("convene")?;

        self.commit_record(ConversationRecord::convened(topic.clone()))
            .await?;
        self.clear_transient_state();

        info!(topic = %topic, "Council convened");
        self.transcript("council_convened", serde_json::json!({ "topic": topic }));
        self.emit(CouncilEvent::Convened { topic });
        Ok(())
    }

    /// Archive the record and clear it. Returns the archive label.
    pub(super) async fn preserve(&mut self) -> Result<String, CouncilError> {
        self.ensure_idle("preserve")?;

        let archive = self
            .store
            .archive(self.config.council_id(), &self.record)
            .await?;
        let messages = self.record.messages.len();
        self.commit_record(ConversationRecord::default()).await?;
        self.clear_transient_state();

        info!(archive = %archive, messages, "Council preserved");
        self.transcript(
            "council_preserved",
            serde_json::json!({ "archive": archive, "messages": messages }),
        );
        self.emit(CouncilEvent::Preserved {
            archive: archive.clone(),
        });
        Ok(archive)
    }

    /// Append an operator message. Operator messages are never deferred.
    pub(super) async fn speak(
        &mut self,
        content: String,
        image: Option<String>,
    ) -> Result<(), CouncilError> {
        if content.trim().is_empty() && image.is_none() {
            return Err(CouncilError::validation("message cannot be empty"));
        }

        let mut message = Message::from_operator(content, self.now());
        if let Some(image) = image {
            message = message.with_image(image);
        }
        self.append_message(message).await;
        Ok(())
    }

    /// Returns `false` if the hand was already raised.
    pub(super) async fn raise_hand(&mut self, reference: &str) -> Result<bool, CouncilError> {
        let agent = self.resolve_agent(reference)?;
        let mut staged = self.record.clone();
        if !staged.raise_hand(agent.clone()) {
            return Ok(false);
        }
        self.commit_record(staged).await?;
        self.emit(CouncilEvent::HandRaised { agent });
        Ok(true)
    }

    /// Returns `false` if the hand was not raised.
    pub(super) async fn lower_hand(&mut self, reference: &str) -> Result<bool, CouncilError> {
        let agent = self.resolve_agent(reference)?;
        let mut staged = self.record.clone();
        if !staged.lower_hand(&agent) {
            return Ok(false);
        }
        self.commit_record(staged).await?;
        self.emit(CouncilEvent::HandLowered { agent });
        Ok(true)
    }

    pub(super) async fn start_timer(&mut self, minutes: u32) -> Result<(), CouncilError> {
        if minutes == 0 {
            return Err(CouncilError::validation("timer must run for at least one minute"));
        }
        let mut staged = self.record.clone();
        staged.start_timer(self.now(), minutes);
        self.commit_record(staged).await?;
        self.emit(CouncilEvent::TimerChanged {
            minutes: Some(minutes),
        });
        Ok(())
    }

    pub(super) async fn clear_timer(&mut self) -> Result<(), CouncilError> {
        let mut staged = self.record.clone();
        staged.clear_timer();
        self.commit_record(staged).await?;
        self.emit(CouncilEvent::TimerChanged { minutes: None });
        Ok(())
    }

    /// Record (or replace) an agent's standing commitment.
    pub(super) async fn commit(&mut self, reference: &str, text: String) -> Result<(), CouncilError> {
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CouncilError::validation("commitment cannot be empty"));
        }
        let agent = self.resolve_agent(reference)?;

        let mut staged = self.record.clone();
        staged.commit(agent.clone(), text.clone(), self.now());
        self.commit_record(staged).await?;
        self.emit(CouncilEvent::Committed { agent, text });
        Ok(())
    }

    fn ensure_idle(&self, action: &str) -> Result<(), CouncilError> {
        if self.session_running() {
            return Err(CouncilError::conflict(format!(
                "cannot {} while a session is running",
                action
            )));
        }
        Ok(())
    }

    /// Drop everything scoped to the current record: a paused session, the
    /// floor, and buffered messages (released, not discarded).
    fn clear_transient_state(&mut self) {
        self.cancel_floor();
        if self.session.is_some() {
            self.end_session(SessionEndReason::Stopped);
        }
        self.deadline = None;
        self.in_flight = None;
        let stranded = self.temporal.flush();
        self.release_entries(stranded);
    }
}
