//! Timing parameters for the council controller.
//!
//! [`TimingParams`] groups every delay the controller schedules on its own:
//! the Chamber handoff delay, the Free Floor countdown, and the temporal
//! release clock.

use council_domain::ReleaseDelay;
use council_domain::temporal::DEFAULT_PERIOD_MS;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingParams {
    /// Delay between a `[NEXT: ...]` directive and the next summon.
    pub handoff_delay: Duration,
    /// Countdown between Free Floor speakers.
    pub floor_countdown: Duration,
    /// Cycle length of the temporal phase clock, in milliseconds.
    pub temporal_period_ms: u64,
    /// How often due temporal entries are released.
    pub temporal_tick: Duration,
    /// Release delay range mapped from resonance.
    pub release_delay: ReleaseDelay,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            handoff_delay: Duration::from_millis(1500),
            floor_countdown: Duration::from_secs(10),
            temporal_period_ms: DEFAULT_PERIOD_MS,
            temporal_tick: Duration::from_millis(50),
            release_delay: ReleaseDelay::default(),
        }
    }
}

impl TimingParams {
    // ==================== Builder Methods ====================

    pub fn with_handoff_delay(mut self, delay: Duration) -> Self {
        self.handoff_delay = delay;
        self
    }

    pub fn with_floor_countdown(mut self, countdown: Duration) -> Self {
        self.floor_countdown = countdown;
        self
    }

    pub fn with_temporal_period_ms(mut self, period_ms: u64) -> Self {
        self.temporal_period_ms = period_ms;
        self
    }

    pub fn with_temporal_tick(mut self, tick: Duration) -> Self {
        self.temporal_tick = tick;
        self
    }

    pub fn with_release_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.release_delay = ReleaseDelay { min_ms, max_ms };
        self
    }
}
