//! Built-in operations for the pipeline DSL.
//!
//! - Sources: `ScalarColumn`, `AllEvents`
//! - Comparisons: `gt`, `within`, `count_eq`
//! - Mask operations: bitwise `&`

pub mod bitwise;
pub mod compare;
pub mod source;

pub use bitwise::AndMasksNode;
pub use compare::{CountEqualsNode, GreaterThanNode, WithinNode};
pub use source::{AllEvents, AllEventsNode, ScalarColumn, ScalarColumnNode};
