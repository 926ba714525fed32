//! Run-wide configuration consumed by the core.
//!
//! All types are immutable once a run starts and deserialize from the YAML or
//! JSON documents supplied by the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particle::ObjectKind;

/// Named numeric selection thresholds, e.g. `z_mass_min_mm` or `met_min_jj`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionConfig(BTreeMap<String, f64>);

impl SelectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Look up a threshold that the analysis cannot run without.
    pub fn require(&self, key: &str) -> Result<f64, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingThreshold {
            key: key.to_string(),
        })
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for SelectionConfig {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Target luminosity of the run and the cross section of every dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetContext {
    pub luminosity: f64,
    #[serde(default)]
    pub cross_sections: BTreeMap<String, f64>,
}

impl DatasetContext {
    pub fn new(luminosity: f64) -> Self {
        Self {
            luminosity,
            cross_sections: BTreeMap::new(),
        }
    }

    pub fn with_cross_section(mut self, dataset: impl Into<String>, xsec: f64) -> Self {
        self.cross_sections.insert(dataset.into(), xsec);
        self
    }

    pub fn cross_section(&self, dataset: &str) -> Result<f64, ConfigError> {
        self.cross_sections
            .get(dataset)
            .copied()
            .ok_or_else(|| ConfigError::MissingCrossSection {
                dataset: dataset.to_string(),
            })
    }
}

/// Per-object kinematic acceptance: `pt > pt_min` and `|eta| < eta_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectThresholds {
    pub pt_min: f64,
    pub eta_max: f64,
}

impl ObjectThresholds {
    pub fn new(pt_min: f64, eta_max: f64) -> Self {
        Self { pt_min, eta_max }
    }

    pub fn default_for(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Muon | ObjectKind::Electron => Self::new(20.0, 2.5),
            ObjectKind::Jet => Self::new(30.0, 4.5),
        }
    }

    pub fn accepts(&self, pt: f64, eta: f64) -> bool {
        pt > self.pt_min && eta.abs() < self.eta_max
    }
}

/// Thresholds for every object kind, defaulting to the standard acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSelectionConfig {
    pub muon: ObjectThresholds,
    pub electron: ObjectThresholds,
    pub jet: ObjectThresholds,
}

impl Default for ObjectSelectionConfig {
    fn default() -> Self {
        Self {
            muon: ObjectThresholds::default_for(ObjectKind::Muon),
            electron: ObjectThresholds::default_for(ObjectKind::Electron),
            jet: ObjectThresholds::default_for(ObjectKind::Jet),
        }
    }
}

impl ObjectSelectionConfig {
    pub fn for_kind(&self, kind: ObjectKind) -> ObjectThresholds {
        match kind {
            ObjectKind::Muon => self.muon,
            ObjectKind::Electron => self.electron,
            ObjectKind::Jet => self.jet,
        }
    }
}
