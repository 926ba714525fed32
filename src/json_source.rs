//! Batches stored as one JSON document per file.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use hinv_primitives::{EventBatch, EventSource, SourceError};
use log::debug;

/// Reads the serialized form of [`EventBatch`], one batch per file.
#[derive(Debug, Clone, Default)]
pub struct JsonBatchSource {
    paths: VecDeque<PathBuf>,
}

impl JsonBatchSource {
    pub fn from_files<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Every `*.json` file in `dir`, in file-name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let io_err = |source| SourceError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        debug!("found {} batch files in {}", paths.len(), dir.display());
        Ok(Self::from_files(paths))
    }

    /// Read and validate one batch file.
    pub fn read_batch(path: &Path) -> Result<EventBatch, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let batch: EventBatch =
            serde_json::from_str(&content).map_err(|source| SourceError::Decode {
                path: path.display().to_string(),
                source,
            })?;
        batch.validate()?;
        Ok(batch)
    }
}

impl EventSource for JsonBatchSource {
    fn next_batch(&mut self) -> Option<Result<EventBatch, SourceError>> {
        let path = self.paths.pop_front()?;
        Some(Self::read_batch(&path))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.paths.len())
    }
}
