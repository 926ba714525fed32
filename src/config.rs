//! Run configuration loaded from YAML.
//!
//! ```yaml
//! luminosity: 5000.0
//! cross_sections:
//!   Signal: 0.5
//!   BackgroundZZ: 12.0
//! selection:
//!   z_mass_min_mm: 80.0
//!   z_mass_max_mm: 100.0
//!   met_min_mm: 100.0
//! channels: [mm]
//! objects:
//!   jet: { pt_min: 40.0, eta_max: 4.7 }
//! output_file: yields.json
//! workers: 8
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hinv_primitives::{
    Channel, ConfigError, DatasetContext, ObjectSelectionConfig, SelectionConfig,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target integrated luminosity.
    pub luminosity: f64,
    /// Cross section of every dataset the run will see.
    #[serde(default)]
    pub cross_sections: BTreeMap<String, f64>,
    pub selection: SelectionConfig,
    #[serde(default = "default_channels")]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub objects: ObjectSelectionConfig,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Worker threads; 0 uses one per core.
    #[serde(default)]
    pub workers: usize,
}

fn default_channels() -> Vec<Channel> {
    Channel::ALL.to_vec()
}

fn default_output_file() -> PathBuf {
    PathBuf::from("yields.json")
}

impl RunConfig {
    pub fn new(luminosity: f64, selection: SelectionConfig) -> Self {
        Self {
            luminosity,
            cross_sections: BTreeMap::new(),
            selection,
            channels: default_channels(),
            objects: ObjectSelectionConfig::default(),
            output_file: default_output_file(),
            workers: 0,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values no run could use. Missing thresholds are reported later,
    /// when the enabled channels resolve their cuts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.luminosity.is_finite() && self.luminosity > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "luminosity".into(),
                value: self.luminosity,
                reason: "must be a positive number",
            });
        }
        for (dataset, &xsec) in &self.cross_sections {
            if !(xsec.is_finite() && xsec >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: format!("cross_sections.{dataset}"),
                    value: xsec,
                    reason: "must be a non-negative number",
                });
            }
        }
        Ok(())
    }

    pub fn dataset_context(&self) -> DatasetContext {
        DatasetContext {
            luminosity: self.luminosity,
            cross_sections: self.cross_sections.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use hinv_primitives::ObjectThresholds;

    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = RunConfig::from_yaml_str(
            "luminosity: 5000\nselection:\n  met_min_mm: 100\n",
        )
        .unwrap();
        assert_eq!(config.channels, Channel::ALL.to_vec());
        assert_eq!(config.output_file, PathBuf::from("yields.json"));
        assert_eq!(config.workers, 0);
        assert_eq!(config.objects, ObjectSelectionConfig::default());
        assert_eq!(config.selection.get("met_min_mm"), Some(100.0));
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
luminosity: 300.0
cross_sections:
  Signal: 0.5
  BackgroundZZ: 12.0
selection:
  mjj_min: 500
  mjj_max: 3000
  met_min_jj: 150
channels: [jj, dimuon]
objects:
  jet: { pt_min: 40.0, eta_max: 4.7 }
output_file: out/results.json
workers: 4
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.channels, vec![Channel::Dijet, Channel::Dimuon]);
        assert_eq!(config.objects.jet, ObjectThresholds::new(40.0, 4.7));
        assert_eq!(config.dataset_context().cross_section("BackgroundZZ"), Ok(12.0));
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_unknown_channel_rejected() {
        let err = RunConfig::from_yaml_str("luminosity: 1\nselection: {}\nchannels: [tautau]\n")
            .unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        assert!(err.is_config());
    }

    #[test]
    fn test_non_positive_luminosity_rejected() {
        let err = RunConfig::from_yaml_str("luminosity: 0\nselection: {}\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == "luminosity"
        ));
    }
}
