//! Per-batch counting analysis.

use std::path::Path;
use std::sync::Arc;

use hinv_accumulator::{ResultAccumulator, ResultSummary};
use hinv_pipeline::ops::ScalarColumn;
use hinv_pipeline::{Engine, PipelineContext};
use hinv_primitives::{
    Channel, DatasetContext, EventBatch, ObjectSelectionConfig, SelectionConfig, fields,
};
use hinv_selection::{ChannelCuts, ChannelSelector, normalize};
use log::{debug, info};

use crate::config::RunConfig;
use crate::error::Error;

/// Applies the channel selections to a batch and reports cutflows and
/// normalized yields.
///
/// The selection graph is built once in [`CountingProcessor::new`] and only
/// read afterwards, so one processor can be shared by any number of worker
/// threads.
#[derive(Debug)]
pub struct CountingProcessor {
    datasets: DatasetContext,
    ctx: Arc<PipelineContext>,
    channels: Vec<ChannelSelector>,
}

impl CountingProcessor {
    /// Resolve the cuts of every enabled channel and build its selection.
    ///
    /// Fails if a threshold of an enabled channel is missing. Duplicate
    /// channels are ignored.
    pub fn new(
        datasets: DatasetContext,
        selection: &SelectionConfig,
        channels: &[Channel],
        objects: ObjectSelectionConfig,
    ) -> Result<Self, Error> {
        let ctx = Arc::new(PipelineContext::new());
        let met = ScalarColumn::new(&ctx, fields::MET);

        let mut selectors: Vec<ChannelSelector> = Vec::with_capacity(channels.len());
        for &channel in channels {
            if selectors.iter().any(|s| s.channel() == channel) {
                continue;
            }
            let cuts = ChannelCuts::from_config(channel, selection)?;
            let thresholds = objects.for_kind(channel.object_kind());
            debug!(
                "channel {channel}: {cuts:?}, {} objects {thresholds:?}",
                channel.object_kind()
            );
            selectors.push(ChannelSelector::build(&ctx, channel, cuts, thresholds, &met));
        }

        Ok(Self {
            datasets,
            ctx,
            channels: selectors,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, Error> {
        Self::new(
            config.dataset_context(),
            &config.selection,
            &config.channels,
            config.objects,
        )
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.iter().map(ChannelSelector::channel)
    }

    pub fn datasets(&self) -> &DatasetContext {
        &self.datasets
    }

    /// Process one batch into a partial result.
    ///
    /// Nothing computed here outlives the call, so batches can be processed
    /// in any order and on any thread.
    pub fn process(&self, batch: &EventBatch) -> Result<ResultAccumulator, Error> {
        let weights = normalize(batch, &self.datasets)?;
        // deserialized batches may not have gone through validation
        batch.validate()?;

        let mut engine = Engine::new(Arc::clone(&self.ctx), batch);
        let mut acc = ResultAccumulator::new();
        for selector in &self.channels {
            let outcome = selector.evaluate(&mut engine, &weights.weights)?;
            acc.record(
                batch.dataset(),
                outcome.channel,
                &outcome.counts,
                outcome.weighted_yield,
            );
        }
        debug!(
            "processed {} events of '{}' ({} channels)",
            batch.len(),
            batch.dataset(),
            self.channels.len()
        );
        Ok(acc)
    }

    /// Persist merged results to `path`.
    pub fn postprocess(
        &self,
        acc: &ResultAccumulator,
        path: impl AsRef<Path>,
    ) -> Result<ResultSummary, Error> {
        let summary = ResultSummary::from(acc);
        summary.write_json(path.as_ref())?;
        info!("results written to {}", path.as_ref().display());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use hinv_primitives::{BatchBuilder, ConfigError, DataShapeError, EventRecord, Particle};

    use super::*;

    fn selection() -> SelectionConfig {
        [
            ("z_mass_min_mm", 80.0),
            ("z_mass_max_mm", 100.0),
            ("met_min_mm", 100.0),
            ("z_mass_min_ee", 80.0),
            ("z_mass_max_ee", 100.0),
            ("met_min_ee", 100.0),
            ("mjj_min", 500.0),
            ("mjj_max", 5000.0),
            ("met_min_jj", 150.0),
        ]
        .into_iter()
        .collect()
    }

    fn z_muons() -> Vec<Particle> {
        vec![
            Particle::new(45.5, 0.0, 0.0, 45.5).with_charge(1.0),
            Particle::new(45.5, 0.0, PI, 45.5).with_charge(-1.0),
        ]
    }

    fn signal_batch() -> EventBatch {
        let mut builder = BatchBuilder::new("Signal");
        for i in 0..10 {
            builder.push(EventRecord {
                muons: if i < 4 { z_muons() } else { vec![] },
                met: 150.0,
                weight: 1.0,
                ..Default::default()
            });
        }
        builder.build()
    }

    #[test]
    fn test_dimuon_batch() {
        let datasets = DatasetContext::new(10.0).with_cross_section("Signal", 0.5);
        let processor = CountingProcessor::new(
            datasets,
            &selection(),
            &Channel::ALL,
            ObjectSelectionConfig::default(),
        )
        .unwrap();
        let acc = processor.process(&signal_batch()).unwrap();

        let cutflow = acc.cutflow_of("Signal", Channel::Dimuon).unwrap();
        assert_eq!(cutflow.counts(), vec![10, 4, 4, 4]);
        // norm = 10 * 0.5 / 10, four events pass
        let yield_mm = acc.yield_of("Signal", Channel::Dimuon).unwrap();
        assert!((yield_mm - 2.0).abs() < 1e-12);
        assert_eq!(acc.yield_of("Signal", Channel::Dijet), Some(0.0));
        assert_eq!(
            acc.cutflow_of("Signal", Channel::Dielectron).unwrap().counts(),
            vec![10, 0, 0, 0]
        );
    }

    #[test]
    fn test_zero_weight_batch() {
        let mut builder = BatchBuilder::new("Signal");
        builder.push(EventRecord {
            muons: z_muons(),
            met: 150.0,
            weight: 0.0,
            ..Default::default()
        });
        let datasets = DatasetContext::new(10.0).with_cross_section("Signal", 0.5);
        let processor =
            CountingProcessor::new(datasets, &selection(), &[Channel::Dimuon], Default::default())
                .unwrap();
        let acc = processor.process(&builder.build()).unwrap();
        assert_eq!(acc.yield_of("Signal", Channel::Dimuon), Some(0.0));
        assert_eq!(acc.cutflow_of("Signal", Channel::Dimuon).unwrap().counts(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_missing_threshold_of_enabled_channel() {
        let mut partial = SelectionConfig::new();
        partial.set("z_mass_min_mm", 80.0).set("z_mass_max_mm", 100.0);
        let err = CountingProcessor::new(
            DatasetContext::new(1.0),
            &partial,
            &[Channel::Dimuon],
            Default::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingThreshold { ref key }) if key == "met_min_mm"
        ));
    }

    #[test]
    fn test_disabled_channels_need_no_thresholds() {
        let mut only_jets = SelectionConfig::new();
        only_jets
            .set("mjj_min", 500.0)
            .set("mjj_max", 5000.0)
            .set("met_min_jj", 150.0);
        let processor = CountingProcessor::new(
            DatasetContext::new(1.0).with_cross_section("Signal", 1.0),
            &only_jets,
            &[Channel::Dijet, Channel::Dijet],
            Default::default(),
        )
        .unwrap();
        assert_eq!(processor.channels().collect::<Vec<_>>(), vec![Channel::Dijet]);
        let acc = processor.process(&signal_batch()).unwrap();
        assert!(acc.cutflow_of("Signal", Channel::Dimuon).is_none());
    }

    #[test]
    fn test_malformed_batch_is_shape_error() {
        let column = r#"{"offsets": [0, 5], "values": [30.0]}"#;
        let json = format!(
            r#"{{
                "metadata": {{"dataset": "Signal"}},
                "n_events": 1,
                "scalars": {{"MET": [150.0], "weight": [1.0], "lumiWeight": [1.0]}},
                "jagged": {{
                    "muon_pt": {column}, "muon_eta": {column}, "muon_phi": {column},
                    "muon_e": {column}, "muon_charge": {column}
                }}
            }}"#
        );
        let batch: EventBatch = serde_json::from_str(&json).unwrap();
        let processor = CountingProcessor::new(
            DatasetContext::new(1.0).with_cross_section("Signal", 1.0),
            &selection(),
            &[Channel::Dimuon],
            Default::default(),
        )
        .unwrap();
        let err = processor.process(&batch).unwrap_err();
        assert!(matches!(
            err,
            Error::Shape(DataShapeError::MalformedOffsets { ref field, .. }) if field == "muon_charge"
        ));
    }

    #[test]
    fn test_missing_cross_section() {
        let processor = CountingProcessor::new(
            DatasetContext::new(1.0),
            &selection(),
            &Channel::ALL,
            Default::default(),
        )
        .unwrap();
        let err = processor.process(&signal_batch()).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Signal"));
    }
}
