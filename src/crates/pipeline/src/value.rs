//! Value types for the pipeline DSL.
//!
//! Every value is event-aligned: entry `i` of the output describes event `i`
//! of the batch under evaluation.

use hinv_primitives::ParticleCollection;

/// Trait for types that can be the value of an expression.
///
/// This is a marker trait that associates a marker type with the concrete
/// output type an expression produces when evaluated.
pub trait ExprValue: 'static {
    /// The concrete Rust type that this expression produces when evaluated.
    type Output: Clone + Send + Sync + 'static;
}

/// Marker type for a per-event boolean mask. `true` means the event passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mask;

impl ExprValue for Mask {
    type Output = Vec<bool>;
}

/// Marker type for a per-event scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Column;

impl ExprValue for Column {
    type Output = Vec<f64>;
}

/// Marker type for a per-event scalar that is undefined for some events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptColumn;

impl ExprValue for OptColumn {
    type Output = Vec<Option<f64>>;
}

/// Marker type for per-event object collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Objects;

impl ExprValue for Objects {
    type Output = Vec<ParticleCollection>;
}

/// Number of events passing `mask`.
pub fn mask_count(mask: &[bool]) -> u64 {
    mask.iter().filter(|&&pass| pass).count() as u64
}

/// Sum of `weights` over the events passing `mask`.
pub fn masked_sum(mask: &[bool], weights: &[f64]) -> f64 {
    mask.iter()
        .zip(weights)
        .filter(|(pass, _)| **pass)
        .map(|(_, w)| *w)
        .sum()
}
