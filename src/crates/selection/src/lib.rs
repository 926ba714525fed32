pub mod channel;
pub mod error;
pub mod objects;
pub mod weights;

/// Analysis-specific nodes for the pipeline DSL.
pub mod ast;

pub use channel::{ChannelCuts, ChannelOutcome, ChannelSelector};
pub use error::SelectionError;
pub use objects::ObjectSelector;
pub use weights::{NormalizedWeights, normalize, normalize_weights};
