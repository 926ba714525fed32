//! The event-source boundary.
//!
//! Reading raw event records from storage lives outside the core; anything
//! that can hand out [`EventBatch`]es one at a time satisfies this trait.

use std::collections::VecDeque;

use crate::error::SourceError;
use crate::event::EventBatch;

pub trait EventSource: Send {
    /// The next batch, or `None` once the source is exhausted.
    fn next_batch(&mut self) -> Option<Result<EventBatch, SourceError>>;

    /// Number of batches left, when known up front.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

/// Batches that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    batches: VecDeque<EventBatch>,
}

impl InMemorySource {
    pub fn new(batches: impl IntoIterator<Item = EventBatch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl From<Vec<EventBatch>> for InMemorySource {
    fn from(batches: Vec<EventBatch>) -> Self {
        Self::new(batches)
    }
}

impl EventSource for InMemorySource {
    fn next_batch(&mut self) -> Option<Result<EventBatch, SourceError>> {
        self.batches.pop_front().map(Ok)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.batches.len())
    }
}
