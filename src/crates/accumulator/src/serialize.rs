//! Flattening and persistence of merged results.
//!
//! The persisted document has two top-level keys:
//!
//! ```json
//! {
//!   "yields": { "Signal_mm": 1.25, ... },
//!   "cutflow": { "Signal": { "mm": { "all_events": 10, ..., "SR": 4 } } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ResultAccumulator;
use crate::cutflow::Cutflow;

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("io error writing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Plain nested-map view of a [`ResultAccumulator`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub yields: BTreeMap<String, f64>,
    pub cutflow: BTreeMap<String, BTreeMap<String, Cutflow>>,
}

impl From<&ResultAccumulator> for ResultSummary {
    fn from(acc: &ResultAccumulator) -> Self {
        let yields = acc
            .yields()
            .iter()
            .map(|(key, value)| (key.flat_name(), *value))
            .collect();
        let cutflow = acc
            .cutflows()
            .iter()
            .map(|(dataset, channels)| {
                let channels = channels
                    .iter()
                    .map(|(channel, cutflow)| (channel.tag().to_string(), cutflow.clone()))
                    .collect();
                (dataset.clone(), channels)
            })
            .collect();
        Self { yields, cutflow }
    }
}

impl ResultSummary {
    pub fn to_json_string(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SerializeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document previously written by [`ResultSummary::write_json`].
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, SerializeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SerializeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Write the document to `path`.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over `path`, so `path` either holds the complete document
    /// or is left untouched.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let path = path.as_ref();
        let io_err = |source| SerializeError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n").map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        info!(
            "wrote {} yields for {} datasets to {}",
            self.yields.len(),
            self.cutflow.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hinv_primitives::Channel;

    use super::*;

    fn accumulator() -> ResultAccumulator {
        let mut acc = ResultAccumulator::new();
        acc.record(
            "Signal",
            Channel::Dimuon,
            &[("all_events", 10), ("2_muons", 4), ("Z_window", 4), ("SR", 4)],
            1.25,
        );
        acc.record(
            "BackgroundZZ",
            Channel::Dijet,
            &[("all_events", 7), ("2_jets", 3), ("Mjj_window", 0), ("SR", 0)],
            0.0,
        );
        acc
    }

    #[test]
    fn test_document_layout() -> anyhow::Result<()> {
        let summary = ResultSummary::from(&accumulator());
        let value: serde_json::Value = serde_json::from_str(&summary.to_json_string()?)?;
        assert_eq!(value["yields"]["Signal_mm"], 1.25);
        assert_eq!(value["yields"]["BackgroundZZ_jj"], 0.0);
        assert_eq!(value["cutflow"]["Signal"]["mm"]["Z_window"], 4);
        assert_eq!(value["cutflow"]["BackgroundZZ"]["jj"]["SR"], 0);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("yields.json");
        let summary = ResultSummary::from(&accumulator());
        summary.write_json(&path)?;
        assert_eq!(ResultSummary::read_json(&path)?, summary);

        let raw = std::fs::read_to_string(&path)?;
        let all_events = raw.find("\"all_events\"").unwrap();
        let sr = raw.find("\"SR\"").unwrap();
        assert!(all_events < sr);
        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_document() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("yields.json");
        std::fs::write(&path, "stale")?;
        ResultSummary::default().write_json(&path)?;
        assert_eq!(ResultSummary::read_json(&path)?, ResultSummary::default());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("yields.json");
        assert!(matches!(
            ResultSummary::default().write_json(&path),
            Err(SerializeError::Io { .. })
        ));
        assert!(!path.exists());
    }
}
