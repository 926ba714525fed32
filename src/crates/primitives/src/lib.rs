pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod kinematics;
pub mod particle;
pub mod source;

pub use channel::{ALL_EVENTS, Channel, SIGNAL_REGION};
pub use config::{DatasetContext, ObjectSelectionConfig, ObjectThresholds, SelectionConfig};
pub use error::{ConfigError, DataShapeError, SourceError};
pub use event::{BatchBuilder, BatchMetadata, EventBatch, EventRecord, JaggedColumn, fields};
pub use kinematics::{FourMomentum, invariant_mass};
pub use particle::{Attribute, ObjectKind, Particle, ParticleCollection};
pub use source::{EventSource, InMemorySource};
