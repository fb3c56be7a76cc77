//! Free Floor speaking queue.
//!
//! The queue is snapshotted from raised hands when the floor opens. The head
//! of the queue is the next speaker; the controller owns the countdown between
//! speakers and pops the head once that speaker has spoken (or failed).

use crate::agent::AgentId;
use crate::core::error::CouncilError;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeFloorQueue {
    queue: VecDeque<AgentId>,
    active: bool,
}

impl FreeFloorQueue {
    /// Open the floor with the given speakers in raise order.
    pub fn open(raised: Vec<AgentId>) -> Result<Self, CouncilError> {
        if raised.is_empty() {
            return Err(CouncilError::validation("no hands are raised"));
        }
        Ok(Self {
            queue: raised.into(),
            active: true,
        })
    }

    /// Next speaker, if the floor is still active.
    pub fn head(&self) -> Option<&AgentId> {
        if self.active { self.queue.front() } else { None }
    }

    /// Remove the head. Deactivates the floor once the queue is exhausted.
    pub fn pop_head(&mut self) -> Option<AgentId> {
        if !self.active {
            return None;
        }
        let head = self.queue.pop_front();
        if self.queue.is_empty() {
            self.active = false;
        }
        head
    }

    /// Empty the queue and deactivate. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &AgentId> {
        self.queue.iter()
    }
}
