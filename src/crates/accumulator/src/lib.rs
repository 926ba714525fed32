//! Mergeable per-dataset results of the counting analysis.
//!
//! Every batch produces a small [`ResultAccumulator`]; accumulators from any
//! number of batches are combined with [`ResultAccumulator::merge`], which is
//! associative and commutative with the empty accumulator as identity.

pub mod cutflow;
pub mod serialize;

use std::collections::BTreeMap;

use hinv_primitives::Channel;

pub use cutflow::Cutflow;
pub use serialize::{ResultSummary, SerializeError};

/// dataset -> channel -> cutflow
pub type CutflowTable = BTreeMap<String, BTreeMap<Channel, Cutflow>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YieldKey {
    pub dataset: String,
    pub channel: Channel,
}

impl YieldKey {
    pub fn new(dataset: impl Into<String>, channel: Channel) -> Self {
        Self {
            dataset: dataset.into(),
            channel,
        }
    }

    /// Flat name used in the persisted document, e.g. `Signal_mm`.
    pub fn flat_name(&self) -> String {
        format!("{}_{}", self.dataset, self.channel.tag())
    }
}

pub type YieldTable = BTreeMap<YieldKey, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultAccumulator {
    cutflows: CutflowTable,
    yields: YieldTable,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the outcome of one channel on one batch.
    pub fn record(
        &mut self,
        dataset: &str,
        channel: Channel,
        counts: &[(&str, u64)],
        weighted_yield: f64,
    ) {
        let cutflow = self
            .cutflows
            .entry(dataset.to_string())
            .or_default()
            .entry(channel)
            .or_default();
        for &(stage, count) in counts {
            cutflow.add(stage, count);
        }
        *self
            .yields
            .entry(YieldKey::new(dataset, channel))
            .or_insert(0.0) += weighted_yield;
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.merge_in(other);
        self
    }

    /// Merge `other` into `self`: keys are unioned, counts and yields of
    /// shared keys are summed.
    pub fn merge_in(&mut self, other: Self) {
        for (dataset, channels) in other.cutflows {
            let mine = self.cutflows.entry(dataset).or_default();
            for (channel, cutflow) in channels {
                mine.entry(channel).or_default().merge_in(&cutflow);
            }
        }
        for (key, value) in other.yields {
            *self.yields.entry(key).or_insert(0.0) += value;
        }
    }

    pub fn merge_all(parts: impl IntoIterator<Item = Self>) -> Self {
        parts.into_iter().fold(Self::default(), Self::merge)
    }

    pub fn is_empty(&self) -> bool {
        self.cutflows.is_empty() && self.yields.is_empty()
    }

    pub fn yield_of(&self, dataset: &str, channel: Channel) -> Option<f64> {
        self.yields.get(&YieldKey::new(dataset, channel)).copied()
    }

    pub fn cutflow_of(&self, dataset: &str, channel: Channel) -> Option<&Cutflow> {
        self.cutflows.get(dataset)?.get(&channel)
    }

    pub fn cutflows(&self) -> &CutflowTable {
        &self.cutflows
    }

    pub fn yields(&self) -> &YieldTable {
        &self.yields
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.cutflows.keys().map(String::as_str)
    }
}
