//! Temporal release gate wiring.

use super::CouncilController;
use crate::ports::council_event::CouncilEvent;
use council_domain::{Arrival, Message, TemporalEntry};
use std::time::Duration;
use tracing::{debug, info};

impl CouncilController {
    /// Enable or disable temporal release. Disabling flushes synchronously and
    /// returns how many messages were released by the flush.
    pub(super) fn set_temporal(&mut self, enabled: bool) -> usize {
        if enabled == self.temporal.is_enabled() {
            return 0;
        }

        let flushed = if enabled {
            self.temporal.enable();
            0
        } else {
            let entries = self.temporal.disable();
            let count = entries.len();
            self.release_entries(entries);
            count
        };

        info!(enabled, flushed, "Temporal release toggled");
        self.emit(CouncilEvent::TemporalToggled { enabled, flushed });
        flushed
    }

    /// Release every buffered message now.
    pub(super) fn flush_temporal(&mut self) -> usize {
        let entries = self.temporal.flush();
        let count = entries.len();
        self.release_entries(entries);
        count
    }

    /// Periodic tick: release entries that are due.
    pub(super) fn release_due(&mut self) {
        let now = self.clock_ms();
        let entries = self.temporal.tick(now);
        self.release_entries(entries);
    }

    pub(super) fn release_entries(&self, entries: Vec<TemporalEntry>) {
        for entry in entries {
            self.emit(CouncilEvent::MessageReleased {
                message: entry.message,
                voice: entry.voice_ref,
            });
        }
    }

    /// Operator messages and unknown speakers bypass the gate.
    pub(super) fn route_release(&mut self, message: Message) {
        let profile = message
            .agent_id()
            .and_then(|id| self.registry.get(id))
            .cloned();
        let Some(profile) = profile else {
            self.emit(CouncilEvent::MessageReleased {
                message,
                voice: None,
            });
            return;
        };

        let now = self.clock_ms();
        match self.temporal.arrive(message, &profile, now) {
            Arrival::Released(message) => self.emit(CouncilEvent::MessageReleased {
                message,
                voice: profile.voice,
            }),
            Arrival::Buffered { delay_ms, .. } => {
                debug!(agent = %profile.id, delay_ms, "Message deferred");
                self.emit(CouncilEvent::MessageDeferred {
                    agent: profile.id,
                    delay: Duration::from_millis(delay_ms),
                });
            }
        }
    }
}
