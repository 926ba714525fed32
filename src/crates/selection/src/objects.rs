//! Per-object kinematic selection.
//!
//! Turns the flat jagged columns of one object kind into event-aligned
//! [`ParticleCollection`]s holding only the objects inside the acceptance.

use hinv_primitives::{
    Attribute, DataShapeError, EventBatch, JaggedColumn, ObjectKind, ObjectThresholds, Particle,
    ParticleCollection,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSelector {
    kind: ObjectKind,
    thresholds: ObjectThresholds,
}

impl ObjectSelector {
    pub fn new(kind: ObjectKind, thresholds: ObjectThresholds) -> Self {
        Self { kind, thresholds }
    }

    pub fn with_defaults(kind: ObjectKind) -> Self {
        Self::new(kind, ObjectThresholds::default_for(kind))
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn thresholds(&self) -> ObjectThresholds {
        self.thresholds
    }

    /// Select the accepted objects of every event, keeping their order.
    ///
    /// Fails if any attribute column of the kind is absent, or if the
    /// attribute columns disagree on the number of objects in an event.
    pub fn select(&self, batch: &EventBatch) -> Result<Vec<ParticleCollection>, DataShapeError> {
        let n_events = batch.len();
        let column = |attr| self.column(batch, attr, n_events);

        let pt = column(Attribute::Pt)?;
        let eta = column(Attribute::Eta)?;
        let phi = column(Attribute::Phi)?;
        let energy = column(Attribute::Energy)?;
        let charge = if self.kind.has_charge() {
            Some(column(Attribute::Charge)?)
        } else {
            None
        };

        let mut selected = Vec::with_capacity(n_events);
        for event in 0..n_events {
            let n_objects = pt.row_len(event);
            let others = [
                (Attribute::Eta, Some(eta)),
                (Attribute::Phi, Some(phi)),
                (Attribute::Energy, Some(energy)),
                (Attribute::Charge, charge),
            ];
            for (attr, col) in others.iter().filter_map(|(a, c)| c.map(|c| (*a, c))) {
                if col.row_len(event) != n_objects {
                    return Err(DataShapeError::LengthMismatch {
                        field: format!("{}[{event}]", self.kind.field(attr)),
                        expected: n_objects,
                        found: col.row_len(event),
                    });
                }
            }

            let (pt, eta, phi, energy) = (
                pt.row(event),
                eta.row(event),
                phi.row(event),
                energy.row(event),
            );
            let charge = charge.map(|c| c.row(event));
            let objects = (0..n_objects)
                .filter(|&j| self.thresholds.accepts(pt[j], eta[j]))
                .map(|j| {
                    let particle = Particle::new(pt[j], eta[j], phi[j], energy[j]);
                    match charge {
                        Some(q) => particle.with_charge(q[j]),
                        None => particle,
                    }
                })
                .collect();
            selected.push(objects);
        }
        Ok(selected)
    }

    fn column<'b>(
        &self,
        batch: &'b EventBatch,
        attr: Attribute,
        n_events: usize,
    ) -> Result<&'b JaggedColumn, DataShapeError> {
        let field = self.kind.field(attr);
        let column = batch.jagged(&field)?;
        column.validate(&field, n_events)?;
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use hinv_primitives::{BatchBuilder, EventRecord};

    use super::*;

    fn muon(pt: f64, eta: f64, charge: f64) -> Particle {
        Particle::new(pt, eta, 0.3, pt * eta.cosh()).with_charge(charge)
    }

    #[test]
    fn test_thresholds_applied_and_order_kept() {
        let mut builder = BatchBuilder::new("Signal");
        builder.push(EventRecord {
            muons: vec![
                muon(45.0, 0.5, 1.0),
                muon(15.0, 0.1, -1.0),
                muon(35.0, -2.7, 1.0),
                muon(25.0, -1.2, -1.0),
            ],
            ..Default::default()
        });
        builder.push(EventRecord::default());
        let batch = builder.build();

        let selected = ObjectSelector::with_defaults(ObjectKind::Muon)
            .select(&batch)
            .unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0], vec![muon(45.0, 0.5, 1.0), muon(25.0, -1.2, -1.0)]);
        assert!(selected[1].is_empty());
    }

    #[test]
    fn test_jets_have_no_charge() {
        let mut builder = BatchBuilder::new("Signal");
        builder.push(EventRecord {
            jets: vec![Particle::new(60.0, 3.9, 1.0, 800.0)],
            ..Default::default()
        });
        let selected = ObjectSelector::with_defaults(ObjectKind::Jet)
            .select(&builder.build())
            .unwrap();
        assert_eq!(selected[0].len(), 1);
        assert_eq!(selected[0][0].charge, None);
    }

    #[test]
    fn test_missing_field_named() {
        let batch = EventBatch::new("Signal", 1)
            .with_jagged("ele_pt", JaggedColumn::from_rows([vec![30.0]]))
            .unwrap();
        let err = ObjectSelector::with_defaults(ObjectKind::Electron)
            .select(&batch)
            .unwrap_err();
        assert_eq!(err, DataShapeError::missing("ele_eta"));
    }

    #[test]
    fn test_inconsistent_object_counts() {
        let rows = |r: Vec<Vec<f64>>| JaggedColumn::from_rows(r);
        let batch = EventBatch::new("Signal", 1)
            .with_jagged("jet_pt", rows(vec![vec![40.0, 50.0]]))
            .and_then(|b| b.with_jagged("jet_eta", rows(vec![vec![0.1, 0.2]])))
            .and_then(|b| b.with_jagged("jet_phi", rows(vec![vec![0.1]])))
            .and_then(|b| b.with_jagged("jet_e", rows(vec![vec![45.0, 55.0]])))
            .unwrap();
        let err = ObjectSelector::with_defaults(ObjectKind::Jet)
            .select(&batch)
            .unwrap_err();
        assert!(matches!(
            err,
            DataShapeError::LengthMismatch { ref field, expected: 2, found: 1 } if field == "jet_phi[0]"
        ));
    }

    #[test]
    fn test_offsets_past_values_rejected() -> anyhow::Result<()> {
        let column = r#"{"offsets": [0, 5], "values": [30.0]}"#;
        let json = format!(
            r#"{{
                "metadata": {{"dataset": "Signal"}},
                "n_events": 1,
                "jagged": {{
                    "muon_pt": {column}, "muon_eta": {column}, "muon_phi": {column},
                    "muon_e": {column}, "muon_charge": {column}
                }}
            }}"#
        );
        let batch: EventBatch = serde_json::from_str(&json)?;
        let err = ObjectSelector::with_defaults(ObjectKind::Muon)
            .select(&batch)
            .unwrap_err();
        assert!(matches!(
            err,
            DataShapeError::MalformedOffsets { ref field, .. } if field == "muon_pt"
        ));
        Ok(())
    }

    #[test]
    fn test_custom_thresholds() {
        let mut builder = BatchBuilder::new("Signal");
        builder.push(EventRecord {
            electrons: vec![muon(22.0, 0.0, 1.0), muon(50.0, 1.0, -1.0)],
            ..Default::default()
        });
        let selector = ObjectSelector::new(ObjectKind::Electron, ObjectThresholds::new(30.0, 2.5));
        let selected = selector.select(&builder.build()).unwrap();
        assert_eq!(selected[0], vec![muon(50.0, 1.0, -1.0)]);
    }
}
