//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout one-to-one. [`FileConfig`]
//! converts into the runtime types once validated: the [`AgentRegistry`],
//! the application's [`CouncilConfig`] and its [`TimingParams`].

use council_application::{CouncilConfig, TimingParams};
use council_domain::{AgentId, AgentProfile, AgentRegistry, CouncilError, DEFAULT_MAX_ROUNDS, RING_POSITIONS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("council id cannot be empty")]
    EmptyCouncilId,

    #[error("max_rounds cannot be 0")]
    ZeroMaxRounds,

    #[error("agent id cannot be empty")]
    EmptyAgentId,

    #[error("duplicate agent id: {0}")]
    DuplicateAgentId(String),

    #[error("agent {agent} has position {position}, expected 1..={max}", max = RING_POSITIONS)]
    InvalidPosition { agent: String, position: u8 },

    #[error("agent {0} must have a positive frequency")]
    InvalidFrequency(String),

    #[error("terminator {0} is not a configured agent")]
    UnknownTerminator(String),

    #[error("temporal_period_ms cannot be 0")]
    ZeroPeriod,

    #[error("min_release_delay_ms must not exceed max_release_delay_ms")]
    InvalidReleaseRange,

    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("responder kind \"http\" requires an endpoint")]
    MissingEndpoint,
}

/// `[council]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Council identifier; also the record name in the store
    pub id: String,
    /// Topic applied when the stored record has none
    pub topic: Option<String>,
    /// Agent id holding the Wisdom role (may conclude sessions)
    pub terminator: Option<String>,
    pub max_rounds: u32,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            topic: None,
            terminator: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// `[timing]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTimingConfig {
    pub handoff_delay_ms: u64,
    pub floor_countdown_secs: u64,
    pub temporal_period_ms: u64,
    pub temporal_tick_ms: u64,
    pub min_release_delay_ms: u64,
    pub max_release_delay_ms: u64,
}

impl Default for FileTimingConfig {
    fn default() -> Self {
        let timing = TimingParams::default();
        Self {
            handoff_delay_ms: timing.handoff_delay.as_millis() as u64,
            floor_countdown_secs: timing.floor_countdown.as_secs(),
            temporal_period_ms: timing.temporal_period_ms,
            temporal_tick_ms: timing.temporal_tick.as_millis() as u64,
            min_release_delay_ms: timing.release_delay.min_ms,
            max_release_delay_ms: timing.release_delay.max_ms,
        }
    }
}

/// One `[[agents]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAgentConfig {
    pub id: String,
    /// Display name; defaults to the id
    #[serde(default)]
    pub name: Option<String>,
    pub position: u8,
    #[serde(default = "default_frequency")]
    pub frequency: f64,
    #[serde(default)]
    pub voice: Option<String>,
}

fn default_frequency() -> f64 {
    1.0
}

impl FileAgentConfig {
    pub fn to_profile(&self) -> AgentProfile {
        let name = self.name.clone().unwrap_or_else(|| self.id.clone());
        let mut profile =
            AgentProfile::new(self.id.as_str(), name, self.position).with_frequency(self.frequency);
        if let Some(voice) = &self.voice {
            profile = profile.with_voice(voice.clone());
        }
        profile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderKind {
    Http,
    #[default]
    Scripted,
}

/// `[responder]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResponderConfig {
    pub kind: ResponderKind,
    /// HTTP endpoint receiving reply requests
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    /// TOML script for the scripted responder
    pub script: Option<PathBuf>,
}

impl Default for FileResponderConfig {
    fn default() -> Self {
        Self {
            kind: ResponderKind::default(),
            endpoint: None,
            timeout_seconds: 60,
            script: None,
        }
    }
}

impl FileResponderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Json,
}

/// `[storage]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub kind: StorageKind,
    /// Directory for the JSON store; defaults to the platform data dir
    pub dir: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Resolved JSON store directory.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("council"))
                .unwrap_or_else(|| PathBuf::from(".council"))
        })
    }
}

/// `[logging]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript path
    pub transcript: Option<PathBuf>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub council: FileCouncilConfig,
    pub timing: FileTimingConfig,
    pub agents: Vec<FileAgentConfig>,
    pub responder: FileResponderConfig,
    pub storage: FileStorageConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.council.id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyCouncilId);
        }
        if self.council.max_rounds == 0 {
            return Err(ConfigValidationError::ZeroMaxRounds);
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.id.trim().is_empty() {
                return Err(ConfigValidationError::EmptyAgentId);
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(ConfigValidationError::DuplicateAgentId(agent.id.clone()));
            }
            if !(1..=RING_POSITIONS).contains(&agent.position) {
                return Err(ConfigValidationError::InvalidPosition {
                    agent: agent.id.clone(),
                    position: agent.position,
                });
            }
            if !(agent.frequency.is_finite() && agent.frequency > 0.0) {
                return Err(ConfigValidationError::InvalidFrequency(agent.id.clone()));
            }
        }

        if let Some(terminator) = &self.council.terminator
            && !seen.contains(terminator.as_str())
        {
            return Err(ConfigValidationError::UnknownTerminator(terminator.clone()));
        }

        if self.timing.temporal_period_ms == 0 {
            return Err(ConfigValidationError::ZeroPeriod);
        }
        if self.timing.min_release_delay_ms > self.timing.max_release_delay_ms {
            return Err(ConfigValidationError::InvalidReleaseRange);
        }

        if self.responder.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.responder.kind == ResponderKind::Http
            && self
                .responder
                .endpoint
                .as_deref()
                .is_none_or(|e| e.trim().is_empty())
        {
            return Err(ConfigValidationError::MissingEndpoint);
        }

        Ok(())
    }

    pub fn timing_params(&self) -> TimingParams {
        let t = &self.timing;
        TimingParams::default()
            .with_handoff_delay(Duration::from_millis(t.handoff_delay_ms))
            .with_floor_countdown(Duration::from_secs(t.floor_countdown_secs))
            .with_temporal_period_ms(t.temporal_period_ms)
            .with_temporal_tick(Duration::from_millis(t.temporal_tick_ms.max(1)))
            .with_release_delay(t.min_release_delay_ms, t.max_release_delay_ms)
    }

    pub fn council_config(&self) -> CouncilConfig {
        let mut config = CouncilConfig::new(self.council.id.clone())
            .with_max_rounds(self.council.max_rounds)
            .with_timing(self.timing_params());
        if let Some(topic) = &self.council.topic {
            config = config.with_default_topic(topic.clone());
        }
        config
    }

    pub fn agent_registry(&self) -> Result<AgentRegistry, CouncilError> {
        let agents = self.agents.iter().map(FileAgentConfig::to_profile).collect();
        let terminator = self.council.terminator.as_deref().map(AgentId::from);
        AgentRegistry::new(agents, terminator)
    }
}
