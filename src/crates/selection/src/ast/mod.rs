//! Analysis nodes for the pipeline DSL.
//!
//! Object selection and pair-mass reconstruction expressed as pipeline nodes,
//! so channel selections compose with the generic mask operations.

mod mass;
mod objects;


pub use mass::{GatedMass, GatedMassNode};
pub use objects::{SelectObjects, SelectObjectsNode};
