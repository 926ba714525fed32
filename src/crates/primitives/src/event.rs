//! Columnar event batches.
//!
//! A batch stores one `Vec<f64>` per scalar field (one entry per event) and
//! one [`JaggedColumn`] per per-object field. The core never mutates a batch;
//! it only looks fields up by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DataShapeError;
use crate::particle::{Attribute, ObjectKind, Particle};

/// Names of the per-event scalar fields the analysis reads.
pub mod fields {
    pub const MET: &str = "MET";
    pub const WEIGHT: &str = "weight";
    pub const LUMI_WEIGHT: &str = "lumiWeight";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub dataset: String,
}

/// Variable-length per-event values, stored flat with `n_events + 1` offsets.
///
/// Row `i` is `values[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JaggedColumn {
    offsets: Vec<usize>,
    values: Vec<f64>,
}

impl Default for JaggedColumn {
    fn default() -> Self {
        Self {
            offsets: vec![0],
            values: Vec::new(),
        }
    }
}

impl JaggedColumn {
    pub fn new(offsets: Vec<usize>, values: Vec<f64>) -> Self {
        Self { offsets, values }
    }

    pub fn from_rows<R: AsRef<[f64]>>(rows: impl IntoIterator<Item = R>) -> Self {
        let mut col = Self::default();
        for row in rows {
            col.push_row(row.as_ref());
        }
        col
    }

    pub fn push_row(&mut self, row: &[f64]) {
        self.values.extend_from_slice(row);
        self.offsets.push(self.values.len());
    }

    /// Number of rows (events) in the column.
    pub fn n_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[self.offsets[i]..self.offsets[i + 1]]
    }

    pub fn row_len(&self, i: usize) -> usize {
        self.offsets[i + 1] - self.offsets[i]
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Check that the offsets describe exactly `n_events` rows over `values`.
    ///
    /// `row` and `row_len` assume this holds.
    pub fn validate(&self, field: &str, n_events: usize) -> Result<(), DataShapeError> {
        let malformed = |reason| DataShapeError::MalformedOffsets {
            field: field.to_string(),
            reason,
        };
        if self.offsets.first() != Some(&0) {
            return Err(malformed("offsets must start at 0"));
        }
        if self.offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(malformed("offsets must be non-decreasing"));
        }
        if self.offsets.last() != Some(&self.values.len()) {
            return Err(malformed("last offset must equal the number of values"));
        }
        if self.n_rows() != n_events {
            return Err(DataShapeError::LengthMismatch {
                field: field.to_string(),
                expected: n_events,
                found: self.n_rows(),
            });
        }
        Ok(())
    }
}

/// An immutable, columnar batch of events from a single dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    pub metadata: BatchMetadata,
    n_events: usize,
    #[serde(default)]
    scalars: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    jagged: BTreeMap<String, JaggedColumn>,
}

impl EventBatch {
    pub fn new(dataset: impl Into<String>, n_events: usize) -> Self {
        Self {
            metadata: BatchMetadata {
                dataset: dataset.into(),
            },
            n_events,
            scalars: BTreeMap::new(),
            jagged: BTreeMap::new(),
        }
    }

    pub fn with_scalar(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, DataShapeError> {
        let name = name.into();
        if values.len() != self.n_events {
            return Err(DataShapeError::LengthMismatch {
                field: name,
                expected: self.n_events,
                found: values.len(),
            });
        }
        self.scalars.insert(name, values);
        Ok(self)
    }

    pub fn with_jagged(
        mut self,
        name: impl Into<String>,
        column: JaggedColumn,
    ) -> Result<Self, DataShapeError> {
        let name = name.into();
        column.validate(&name, self.n_events)?;
        self.jagged.insert(name, column);
        Ok(self)
    }

    pub fn dataset(&self) -> &str {
        &self.metadata.dataset
    }

    pub fn len(&self) -> usize {
        self.n_events
    }

    pub fn is_empty(&self) -> bool {
        self.n_events == 0
    }

    pub fn scalar(&self, name: &str) -> Result<&[f64], DataShapeError> {
        self.scalars
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DataShapeError::missing(name))
    }

    pub fn jagged(&self, name: &str) -> Result<&JaggedColumn, DataShapeError> {
        self.jagged
            .get(name)
            .ok_or_else(|| DataShapeError::missing(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.scalars.contains_key(name) || self.jagged.contains_key(name)
    }

    /// Check every column against the declared event count.
    ///
    /// Batches built through [`EventBatch::with_scalar`] and
    /// [`EventBatch::with_jagged`] are valid by construction; deserialized
    /// batches must be validated before use.
    pub fn validate(&self) -> Result<(), DataShapeError> {
        for (name, values) in &self.scalars {
            if values.len() != self.n_events {
                return Err(DataShapeError::LengthMismatch {
                    field: name.clone(),
                    expected: self.n_events,
                    found: values.len(),
                });
            }
        }
        for (name, column) in &self.jagged {
            column.validate(name, self.n_events)?;
        }
        Ok(())
    }
}

/// One event described row-wise, used to assemble batches.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub muons: Vec<Particle>,
    pub electrons: Vec<Particle>,
    pub jets: Vec<Particle>,
    pub met: f64,
    pub weight: f64,
    pub lumi_weight: f64,
}

impl Default for EventRecord {
    fn default() -> Self {
        Self {
            muons: Vec::new(),
            electrons: Vec::new(),
            jets: Vec::new(),
            met: 0.0,
            weight: 1.0,
            lumi_weight: 1.0,
        }
    }
}

impl EventRecord {
    fn objects(&self, kind: ObjectKind) -> &[Particle] {
        match kind {
            ObjectKind::Muon => &self.muons,
            ObjectKind::Electron => &self.electrons,
            ObjectKind::Jet => &self.jets,
        }
    }
}

/// Row-wise builder producing a columnar [`EventBatch`] with every field the
/// analysis reads.
#[derive(Debug, Clone, Default)]
pub struct BatchBuilder {
    dataset: String,
    events: Vec<EventRecord>,
}

impl BatchBuilder {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: EventRecord) -> &mut Self {
        self.events.push(event);
        self
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = EventRecord>) -> &mut Self {
        self.events.extend(events);
        self
    }

    pub fn build(&self) -> EventBatch {
        let mut batch = EventBatch::new(self.dataset.clone(), self.events.len());

        let scalar = |f: fn(&EventRecord) -> f64| self.events.iter().map(f).collect::<Vec<_>>();
        batch
            .scalars
            .insert(fields::MET.to_string(), scalar(|e| e.met));
        batch
            .scalars
            .insert(fields::WEIGHT.to_string(), scalar(|e| e.weight));
        batch
            .scalars
            .insert(fields::LUMI_WEIGHT.to_string(), scalar(|e| e.lumi_weight));

        for kind in ObjectKind::ALL {
            for &attr in kind.attributes() {
                let column = JaggedColumn::from_rows(self.events.iter().map(|e| {
                    e.objects(kind)
                        .iter()
                        .map(|p| p.attribute(attr))
                        .collect::<Vec<_>>()
                }));
                batch.jagged.insert(kind.field(attr), column);
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jagged_rows() {
        let col = JaggedColumn::from_rows([vec![1.0, 2.0], vec![], vec![3.0]]);
        assert_eq!(col.n_rows(), 3);
        assert_eq!(col.row(0), &[1.0, 2.0]);
        assert!(col.row(1).is_empty());
        assert_eq!(col.row_len(2), 1);
        assert_eq!(col.offsets(), &[0, 2, 2, 3]);
    }

    #[test]
    fn test_missing_field_is_named() {
        let batch = EventBatch::new("Signal", 2);
        let err = batch.scalar(fields::MET).unwrap_err();
        assert_eq!(err, DataShapeError::missing("MET"));
        assert!(err.to_string().contains("MET"));
    }

    #[test]
    fn test_scalar_length_checked() {
        let err = EventBatch::new("Signal", 2)
            .with_scalar("MET", vec![1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            DataShapeError::LengthMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_offsets_rejected() {
        let col = JaggedColumn::new(vec![0, 3, 1], vec![1.0, 2.0, 3.0]);
        let err = EventBatch::new("Signal", 2)
            .with_jagged("muon_pt", col)
            .unwrap_err();
        assert!(matches!(err, DataShapeError::MalformedOffsets { .. }));
    }

    #[test]
    fn test_builder_produces_all_fields() {
        let mut builder = BatchBuilder::new("BackgroundZZ");
        builder.push(EventRecord {
            muons: vec![Particle::new(30.0, 0.1, 0.2, 40.0).with_charge(-1.0)],
            jets: vec![Particle::new(50.0, 1.0, 0.0, 80.0)],
            met: 120.0,
            ..Default::default()
        });
        builder.push(EventRecord::default());
        let batch = builder.build();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.dataset(), "BackgroundZZ");
        assert!(batch.validate().is_ok());
        assert_eq!(batch.scalar(fields::MET).unwrap(), &[120.0, 0.0]);
        assert_eq!(batch.jagged("muon_charge").unwrap().row(0), &[-1.0]);
        assert_eq!(batch.jagged("ele_pt").unwrap().row_len(0), 0);
        assert!(!batch.has_field("jet_charge"));
    }

    #[test]
    fn test_deserialized_batch_validation() -> anyhow::Result<()> {
        let json = r#"{
            "metadata": {"dataset": "Signal"},
            "n_events": 2,
            "scalars": {"MET": [1.0]}
        }"#;
        let batch: EventBatch = serde_json::from_str(json)?;
        assert!(batch.validate().is_err());
        Ok(())
    }
}
