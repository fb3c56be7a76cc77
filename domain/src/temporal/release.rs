//! Temporal release gate.
//!
//! Sits between the conversation log and the audience. While disabled every
//! message passes straight through; while enabled each agent message is held
//! for a resonance-dependent delay. Disabling always flushes first so no entry
//! can be stranded.

use super::buffer::{TemporalBuffer, TemporalEntry};
use super::phase::{PhaseClock, ReleaseDelay};
use crate::agent::AgentProfile;
use crate::conversation::Message;

/// What happened to an arriving message.
#[derive(Debug, Clone, PartialEq)]
pub enum Arrival {
    /// Surfaced immediately
    Released(Message),
    /// Held until `release_at`
    Buffered { release_at: u64, delay_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct TemporalRelease {
    enabled: bool,
    clock: PhaseClock,
    delay: ReleaseDelay,
    buffer: TemporalBuffer,
}

impl TemporalRelease {
    pub fn new(clock: PhaseClock, delay: ReleaseDelay) -> Self {
        Self {
            enabled: false,
            clock,
            delay,
            buffer: TemporalBuffer::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable and return whatever was still buffered, in release order.
    pub fn disable(&mut self) -> Vec<TemporalEntry> {
        let flushed = self.buffer.flush();
        self.enabled = false;
        flushed
    }

    /// Route a message from `profile` that arrived at `now_ms`.
    pub fn arrive(&mut self, message: Message, profile: &AgentProfile, now_ms: u64) -> Arrival {
        if !self.enabled {
            return Arrival::Released(message);
        }

        let resonance = self.clock.resonance(profile, now_ms);
        let delay_ms = self.delay.for_resonance(resonance);
        let release_at = now_ms + delay_ms;
        self.buffer.insert(TemporalEntry {
            message,
            agent_id: profile.id.clone(),
            voice_ref: profile.voice.clone(),
            created_at: now_ms,
            release_at,
        });

        Arrival::Buffered {
            release_at,
            delay_ms,
        }
    }

    /// Release every entry that is due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<TemporalEntry> {
        self.buffer.drain_due(now_ms)
    }

    /// Release everything immediately.
    pub fn flush(&mut self) -> Vec<TemporalEntry> {
        self.buffer.flush()
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn next_release_at(&self) -> Option<u64> {
        self.buffer.next_release_at()
    }
}
