//! Phase clock and per-agent resonance.
//!
//! A single global phase cycles through `[0, 2π)` every `period_ms`. Each
//! agent sits at a fixed position on an eight-slot ring and drifts against
//! the global phase by its frequency multiplier. Resonance is the cosine of
//! the angle between the two, and release delay shrinks as `|resonance|`
//! approaches 1.

use crate::agent::{AgentProfile, RING_POSITIONS};
use std::f64::consts::TAU;

/// Default cycle length of the global phase
pub const DEFAULT_PERIOD_MS: u64 = 6000;

/// Global phase function anchored at `origin_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    origin_ms: u64,
    period_ms: u64,
}

impl PhaseClock {
    /// A zero period is treated as one millisecond.
    pub fn new(origin_ms: u64, period_ms: u64) -> Self {
        Self {
            origin_ms,
            period_ms: period_ms.max(1),
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// `((t − t0) mod P) / P × 2π`. Times before the origin read as phase 0.
    pub fn phase_at(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.origin_ms) % self.period_ms;
        elapsed as f64 / self.period_ms as f64 * TAU
    }

    /// Resonance of `profile` at `now_ms`, in `[-1, 1]`.
    pub fn resonance(&self, profile: &AgentProfile, now_ms: u64) -> f64 {
        resonance(profile.position, profile.frequency, self.phase_at(now_ms))
    }
}

/// Fixed angle of ring position `k` (1-based).
pub fn base_phase(position: u8) -> f64 {
    let k = position.clamp(1, RING_POSITIONS);
    f64::from(k - 1) / f64::from(RING_POSITIONS) * TAU
}

/// `cos(agentPhase − phase)` where `agentPhase = basePhase(k) + (m − 1)·phase`.
pub fn resonance(position: u8, frequency: f64, phase: f64) -> f64 {
    let agent_phase = base_phase(position) + (frequency - 1.0) * phase;
    (agent_phase - phase).cos()
}

/// Maps resonance onto a release delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDelay {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ReleaseDelay {
    fn default() -> Self {
        Self {
            min_ms: 500,
            max_ms: 4000,
        }
    }
}

impl ReleaseDelay {
    /// `min + (1 − |r|) × (max − min)`, rounded to the nearest millisecond.
    pub fn for_resonance(&self, resonance: f64) -> u64 {
        let factor = (1.0 - resonance.abs()).clamp(0.0, 1.0);
        let span = self.max_ms.saturating_sub(self.min_ms) as f64;
        self.min_ms + (factor * span).round() as u64
    }
}
