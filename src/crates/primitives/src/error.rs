//! Error taxonomy shared by every crate of the analysis.
//!
//! Configuration and data-shape problems are fatal and always surface as one
//! of these types. Degenerate numeric conditions (zero batch weight, events
//! without enough objects) are never errors.

use thiserror::Error;

/// A run cannot proceed with the configuration it was given.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no cross section configured for dataset '{dataset}'")]
    MissingCrossSection { dataset: String },

    #[error("selection configuration is missing required threshold '{key}'")]
    MissingThreshold { key: String },

    #[error("invalid value {value} for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown channel '{0}' (expected one of mm, ee, jj)")]
    UnknownChannel(String),
}

/// A batch does not provide the fields the analysis needs, or provides them
/// with inconsistent lengths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataShapeError {
    #[error("batch is missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' has {found} entries, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("jagged field '{field}' has malformed offsets: {reason}")]
    MalformedOffsets { field: String, reason: &'static str },

    #[error("pipeline node '{node}' produced a value of an unexpected type")]
    NodeType { node: &'static str },
}

impl DataShapeError {
    pub fn missing(field: impl Into<String>) -> Self {
        DataShapeError::MissingField {
            field: field.into(),
        }
    }
}

/// Failure to produce the next batch from an event source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode batch '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Shape(#[from] DataShapeError),
}
