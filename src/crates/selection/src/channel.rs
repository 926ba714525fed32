//! Staged channel selection.
//!
//! A channel is a chain of cumulative masks, one per cutflow stage:
//! all events, exactly two selected objects, pair mass inside the window,
//! MET above threshold. The chain is built once per run and evaluated against
//! each batch by a fresh [`Engine`].

use std::sync::Arc;

use hinv_pipeline::ops::{AllEvents, ScalarColumn};
use hinv_pipeline::{Column, Engine, Expr, Mask, PipelineContext, mask_count, masked_sum};
use hinv_primitives::{
    Channel, ConfigError, DataShapeError, ObjectThresholds, SelectionConfig, fields,
};

use crate::ast::{GatedMass, SelectObjects};

/// Numeric cuts of one channel, resolved from the selection configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCuts {
    pub mass_min: f64,
    pub mass_max: f64,
    pub met_min: f64,
}

impl ChannelCuts {
    pub fn from_config(channel: Channel, config: &SelectionConfig) -> Result<Self, ConfigError> {
        let keys = channel.threshold_keys();
        let cuts = Self {
            mass_min: config.require(keys.mass_min)?,
            mass_max: config.require(keys.mass_max)?,
            met_min: config.require(keys.met_min)?,
        };
        if cuts.mass_min > cuts.mass_max {
            return Err(ConfigError::InvalidValue {
                key: keys.mass_min.to_string(),
                value: cuts.mass_min,
                reason: "mass window minimum exceeds its maximum",
            });
        }
        Ok(cuts)
    }
}

/// Per-batch result of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOutcome {
    pub channel: Channel,
    /// Events passing each stage, in stage order.
    pub counts: Vec<(&'static str, u64)>,
    /// Sum of the final weights of events passing every stage.
    pub weighted_yield: f64,
}

#[derive(Debug, Clone)]
pub struct ChannelSelector {
    channel: Channel,
    stages: [Expr<Mask>; 4],
}

impl ChannelSelector {
    /// Register the stage masks of `channel` in `ctx`.
    ///
    /// `met` is passed in so that every channel of a run shares one MET column.
    pub fn build(
        ctx: &Arc<PipelineContext>,
        channel: Channel,
        cuts: ChannelCuts,
        thresholds: ObjectThresholds,
        met: &Expr<Column>,
    ) -> Self {
        let objects = SelectObjects::new(ctx, channel.object_kind(), thresholds);

        let all_events = AllEvents::new(ctx);
        let pair = &all_events & &objects.count_eq(2);
        let in_window = &pair
            & &GatedMass::new(&objects, &pair).within(cuts.mass_min, cuts.mass_max);
        let signal_region = &in_window & &met.gt(cuts.met_min);

        Self {
            channel,
            stages: [all_events, pair, in_window, signal_region],
        }
    }

    /// Build a selector with its own MET column, for standalone use.
    pub fn standalone(
        ctx: &Arc<PipelineContext>,
        channel: Channel,
        cuts: ChannelCuts,
        thresholds: ObjectThresholds,
    ) -> Self {
        let met = ScalarColumn::new(ctx, fields::MET);
        Self::build(ctx, channel, cuts, thresholds, &met)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Mask of events in the signal region.
    pub fn signal_region(&self) -> &Expr<Mask> {
        &self.stages[3]
    }

    /// Count the events passing each stage and sum the final weights of the
    /// events in the signal region.
    pub fn evaluate(
        &self,
        engine: &mut Engine<'_>,
        weights: &[f64],
    ) -> Result<ChannelOutcome, DataShapeError> {
        let n_events = engine.batch().len();
        if weights.len() != n_events {
            return Err(DataShapeError::LengthMismatch {
                field: fields::WEIGHT.to_string(),
                expected: n_events,
                found: weights.len(),
            });
        }

        let mut counts = Vec::with_capacity(self.stages.len());
        for (name, stage) in self.channel.stages().into_iter().zip(&self.stages) {
            counts.push((name, mask_count(engine.eval_ref(stage)?)));
        }
        let weighted_yield = masked_sum(engine.eval_ref(self.signal_region())?, weights);

        Ok(ChannelOutcome {
            channel: self.channel,
            counts,
            weighted_yield,
        })
    }
}
