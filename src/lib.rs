//! Counting analysis over columnar collision-event batches.
//!
//! A [`CountingProcessor`] turns one [`EventBatch`](hinv_primitives::EventBatch)
//! into a partial [`ResultAccumulator`]; an [`Executor`] runs it over every
//! batch of an [`EventSource`](hinv_primitives::EventSource) in parallel and
//! merges the partial results.

pub mod config;
pub mod error;
pub mod executor;
pub mod json_source;
pub mod processor;

pub use config::RunConfig;
pub use error::Error;
pub use executor::Executor;
pub use json_source::JsonBatchSource;
pub use processor::CountingProcessor;

pub use hinv_accumulator::{Cutflow, ResultAccumulator, ResultSummary};
pub use hinv_primitives::{Channel, DatasetContext, ObjectSelectionConfig, SelectionConfig};
