//! Luminosity and cross-section normalization of event weights.
//!
//! The normalization factor is computed per batch:
//! `norm = luminosity * cross_section / sum(weight * lumiWeight)`, and every
//! event ends up with `weight * lumiWeight * norm`.

use hinv_primitives::{DataShapeError, DatasetContext, EventBatch, fields};
use log::{debug, warn};

use crate::error::SelectionError;

/// Final per-event weights of one batch together with the factor that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWeights {
    pub norm: f64,
    pub weights: Vec<f64>,
}

impl NormalizedWeights {
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Normalize raw event weights to `luminosity * cross_section`.
///
/// A batch whose event weights sum to exactly zero gets `norm = 0`, so all of
/// its final weights are zero.
pub fn normalize_weights(
    raw: &[f64],
    lumi: &[f64],
    luminosity: f64,
    cross_section: f64,
) -> Result<NormalizedWeights, DataShapeError> {
    if raw.len() != lumi.len() {
        return Err(DataShapeError::LengthMismatch {
            field: fields::LUMI_WEIGHT.to_string(),
            expected: raw.len(),
            found: lumi.len(),
        });
    }

    let event_weights: Vec<f64> = raw.iter().zip(lumi).map(|(w, l)| w * l).collect();
    let sum: f64 = event_weights.iter().sum();
    let norm = if sum == 0.0 {
        0.0
    } else {
        luminosity * cross_section / sum
    };

    Ok(NormalizedWeights {
        norm,
        weights: event_weights.into_iter().map(|w| w * norm).collect(),
    })
}

/// Normalize the weights of `batch` using its dataset's cross section.
///
/// The cross section is looked up before anything else, so a dataset without
/// one is rejected even when its batch carries no weight at all.
pub fn normalize(
    batch: &EventBatch,
    datasets: &DatasetContext,
) -> Result<NormalizedWeights, SelectionError> {
    let cross_section = datasets.cross_section(batch.dataset())?;
    let raw = batch.scalar(fields::WEIGHT)?;
    let lumi = batch.scalar(fields::LUMI_WEIGHT)?;

    let normalized = normalize_weights(raw, lumi, datasets.luminosity, cross_section)?;
    if normalized.norm == 0.0 && !batch.is_empty() {
        warn!(
            "batch of {} events from '{}' has zero total weight, yields set to zero",
            batch.len(),
            batch.dataset()
        );
    }
    debug!(
        "dataset '{}': {} events, norm = {}",
        batch.dataset(),
        batch.len(),
        normalized.norm
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use hinv_primitives::{BatchBuilder, ConfigError, EventRecord};

    use super::*;

    #[test]
    fn test_weights_sum_to_lumi_times_xsec() {
        let n = normalize_weights(&[1.0, 2.0, 1.0], &[0.5, 0.5, 2.0], 100.0, 0.3).unwrap();
        // event weights 0.5, 1.0, 2.0
        assert!((n.norm - 30.0 / 3.5).abs() < 1e-12);
        assert!((n.total() - 30.0).abs() < 1e-9);
        assert!((n.weights[2] / n.weights[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sum_gives_zero_norm() {
        let n = normalize_weights(&[1.0, -1.0], &[1.0, 1.0], 100.0, 5.0).unwrap();
        assert_eq!(n.norm, 0.0);
        assert_eq!(n.weights, vec![0.0, 0.0]);

        let empty = normalize_weights(&[], &[], 100.0, 5.0).unwrap();
        assert_eq!(empty.norm, 0.0);
        assert!(empty.weights.is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            normalize_weights(&[1.0, 1.0], &[1.0], 1.0, 1.0),
            Err(DataShapeError::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_missing_cross_section_checked_first() {
        let mut builder = BatchBuilder::new("BackgroundWW");
        builder.push(EventRecord {
            weight: 0.0,
            ..Default::default()
        });
        let datasets = DatasetContext::new(5000.0).with_cross_section("Signal", 0.5);
        assert_eq!(
            normalize(&builder.build(), &datasets).unwrap_err(),
            SelectionError::Config(ConfigError::MissingCrossSection {
                dataset: "BackgroundWW".into()
            })
        );
    }

    #[test]
    fn test_missing_weight_field() {
        let batch = EventBatch::new("Signal", 1)
            .with_scalar(fields::WEIGHT, vec![1.0])
            .unwrap();
        let datasets = DatasetContext::new(1.0).with_cross_section("Signal", 1.0);
        assert_eq!(
            normalize(&batch, &datasets).unwrap_err(),
            SelectionError::Shape(DataShapeError::missing(fields::LUMI_WEIGHT))
        );
    }
}
