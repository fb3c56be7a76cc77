//! Council configuration container.
//!
//! [`CouncilConfig`] is everything the controller needs besides its
//! collaborators: which council it owns, the session defaults and the timing
//! parameters. It is built once by the composition root and never mutated.

use super::TimingParams;
use council_domain::DEFAULT_MAX_ROUNDS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouncilConfig {
    council_id: String,
    default_topic: Option<String>,
    max_rounds: u32,
    timing: TimingParams,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

impl CouncilConfig {
    pub fn new(council_id: impl Into<String>) -> Self {
        Self {
            council_id: council_id.into(),
            default_topic: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            timing: TimingParams::default(),
        }
    }

    // ==================== Accessors ====================

    pub fn council_id(&self) -> &str {
        &self.council_id
    }

    /// Topic used when the stored record has none
    pub fn default_topic(&self) -> Option<&str> {
        self.default_topic.as_deref()
    }

    /// Round cap for sessions started without an explicit one
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn timing(&self) -> &TimingParams {
        &self.timing
    }

    // ==================== Builder Methods ====================

    pub fn with_default_topic(mut self, topic: impl Into<String>) -> Self {
        self.default_topic = Some(topic.into());
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_timing(mut self, timing: TimingParams) -> Self {
        self.timing = timing;
        self
    }
}
