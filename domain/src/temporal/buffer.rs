//! Release buffer ordered by `release_at`, ties broken by `created_at`.

use crate::agent::AgentId;
use crate::conversation::Message;
use std::collections::VecDeque;

/// A message held back until `release_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalEntry {
    pub message: Message,
    pub agent_id: AgentId,
    pub voice_ref: Option<String>,
    pub created_at: u64,
    pub release_at: u64,
}

impl TemporalEntry {
    pub fn content(&self) -> &str {
        &self.message.content
    }

    fn sort_key(&self) -> (u64, u64) {
        (self.release_at, self.created_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemporalBuffer {
    entries: VecDeque<TemporalEntry>,
}

impl TemporalBuffer {
    /// Insert keeping the sort order. Equal keys keep arrival order.
    pub fn insert(&mut self, entry: TemporalEntry) {
        let key = entry.sort_key();
        let index = self.entries.partition_point(|e| e.sort_key() <= key);
        self.entries.insert(index, entry);
    }

    /// Pop every head entry with `release_at <= now`, in ascending order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<TemporalEntry> {
        let due = self.entries.partition_point(|e| e.release_at <= now_ms);
        self.entries.drain(..due).collect()
    }

    /// Pop everything regardless of `release_at`.
    pub fn flush(&mut self) -> Vec<TemporalEntry> {
        self.entries.drain(..).collect()
    }

    pub fn next_release_at(&self) -> Option<u64> {
        self.entries.front().map(|e| e.release_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemporalEntry> {
        self.entries.iter()
    }
}
