use std::path::PathBuf;

use hinv_accumulator::SerializeError;
use hinv_primitives::{ConfigError, DataShapeError, SourceError};
use hinv_selection::SelectionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed batch: {0}")]
    Shape(#[from] DataShapeError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("could not parse run configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<SelectionError> for Error {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::Config(e) => Error::Config(e),
            SelectionError::Shape(e) => Error::Shape(e),
        }
    }
}

impl Error {
    /// Whether the run failed because of its configuration rather than its
    /// input data.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Yaml(_))
    }
}
