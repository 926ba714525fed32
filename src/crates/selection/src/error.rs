use hinv_primitives::{ConfigError, DataShapeError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shape(#[from] DataShapeError),
}
