//! Conversation record entities

use crate::agent::{AgentId, Speaker};
use crate::vote::VoteState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single utterance in the council (Entity, immutable once appended).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker_name: String,
    pub speaker: Speaker,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Optional image reference attached by the speaker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Message {
    pub fn from_agent(
        agent_id: AgentId,
        speaker_name: impl Into<String>,
        content: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            speaker_name: speaker_name.into(),
            speaker: Speaker::Agent(agent_id),
            content: content.into(),
            timestamp,
            image: None,
        }
    }

    pub fn from_operator(content: impl Into<String>, timestamp: u64) -> Self {
        Self {
            speaker_name: "Operator".to_string(),
            speaker: Speaker::Operator,
            content: content.into(),
            timestamp,
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn agent_id(&self) -> Option<&AgentId> {
        self.speaker.agent_id()
    }
}

/// A standing commitment an agent has made during the council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub made_at: u64,
}

/// The shared conversation record of one council.
///
/// Created on convene, mutated by every speak/vote/hand-raise action and
/// cleared on preserve. `messages` is append-only and defines the canonical
/// speaking order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationRecord {
    pub topic: String,
    pub messages: Vec<Message>,
    /// Raised hands in raise order, without duplicates
    pub raised_hands: Vec<AgentId>,
    pub timer_start: Option<u64>,
    pub timer_duration_minutes: Option<u32>,
    pub vote: Option<VoteState>,
    pub commitments: BTreeMap<AgentId, Commitment>,
}

impl ConversationRecord {
    /// A fresh record for a newly convened council.
    pub fn convened(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Raise a hand. Returns `false` if the agent's hand was already raised.
    pub fn raise_hand(&mut self, agent: AgentId) -> bool {
        if self.raised_hands.contains(&agent) {
            return false;
        }
        self.raised_hands.push(agent);
        true
    }

    /// Lower a hand. Returns `false` if the agent's hand was not raised.
    pub fn lower_hand(&mut self, agent: &AgentId) -> bool {
        let before = self.raised_hands.len();
        self.raised_hands.retain(|a| a != agent);
        before != self.raised_hands.len()
    }

    /// Drain the raised-hand set in raise order.
    pub fn take_raised_hands(&mut self) -> Vec<AgentId> {
        std::mem::take(&mut self.raised_hands)
    }

    pub fn start_timer(&mut self, now: u64, minutes: u32) {
        self.timer_start = Some(now);
        self.timer_duration_minutes = Some(minutes);
    }

    pub fn clear_timer(&mut self) {
        self.timer_start = None;
        self.timer_duration_minutes = None;
    }

    /// Milliseconds left on the council timer, if one is running.
    pub fn timer_remaining_ms(&self, now: u64) -> Option<u64> {
        let start = self.timer_start?;
        let minutes = self.timer_duration_minutes?;
        let end = start + u64::from(minutes) * 60_000;
        Some(end.saturating_sub(now))
    }

    pub fn commit(&mut self, agent: AgentId, text: impl Into<String>, now: u64) {
        self.commitments.insert(
            agent,
            Commitment {
                text: text.into(),
                made_at: now,
            },
        );
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raised_hands_keep_raise_order() {
        let mut record = ConversationRecord::convened("Ethics of automation");
        assert!(record.raise_hand(AgentId::new("c")));
        assert!(record.raise_hand(AgentId::new("a")));
        assert!(!record.raise_hand(AgentId::new("c")));
        assert!(record.raise_hand(AgentId::new("b")));

        assert_eq!(
            record.raised_hands,
            vec![AgentId::new("c"), AgentId::new("a"), AgentId::new("b")]
        );

        assert!(record.lower_hand(&AgentId::new("a")));
        assert!(!record.lower_hand(&AgentId::new("a")));

        let taken = record.take_raised_hands();
        assert_eq!(taken, vec![AgentId::new("c"), AgentId::new("b")]);
        assert!(record.raised_hands.is_empty());
    }

    #[test]
    fn test_timer_remaining() {
        let mut record = ConversationRecord::default();
        assert_eq!(record.timer_remaining_ms(0), None);

        record.start_timer(1_000, 2);
        assert_eq!(record.timer_remaining_ms(1_000), Some(120_000));
        assert_eq!(record.timer_remaining_ms(61_000), Some(60_000));
        assert_eq!(record.timer_remaining_ms(500_000), Some(0));

        record.clear_timer();
        assert_eq!(record.timer_remaining_ms(1_000), None);
    }

    #[test]
    fn test_commit_replaces_previous() {
        let mut record = ConversationRecord::default();
        record.commit(AgentId::new("muse"), "Draft the outline", 10);
        record.commit(AgentId::new("muse"), "Draft the conclusion", 20);

        assert_eq!(record.commitments.len(), 1);
        let commitment = &record.commitments[&AgentId::new("muse")];
        assert_eq!(commitment.text, "Draft the conclusion");
        assert_eq!(commitment.made_at, 20);
    }

    #[test]
    fn test_record_json_shape() {
        let mut record = ConversationRecord::convened("Topic");
        record.append(Message::from_operator("Welcome", 5));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["topic"], "Topic");
        assert_eq!(json["messages"][0]["speaker"]["kind"], "operator");
        assert!(json["messages"][0].get("image").is_none());
    }
}
