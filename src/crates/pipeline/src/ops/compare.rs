//! Threshold comparisons turning per-event values into masks.

use hinv_primitives::DataShapeError;

use crate::engine::EvalContext;
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::value::{Column, Mask, Objects, OptColumn};

/// `value > threshold` for every event.
pub struct GreaterThanNode {
    input: Expr<Column>,
    threshold: f64,
}

impl Node for GreaterThanNode {
    type OutputValue = Mask;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![self.input.id()]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<bool>, DataShapeError> {
        Ok(ctx
            .get(&self.input)
            .iter()
            .map(|&v| v > self.threshold)
            .collect())
    }

    fn name(&self) -> &'static str {
        "GreaterThan"
    }
}

/// `min < value < max` for every event. Events where the value is undefined
/// fail the window.
pub struct WithinNode {
    input: Expr<OptColumn>,
    min: f64,
    max: f64,
}

impl Node for WithinNode {
    type OutputValue = Mask;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![self.input.id()]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<bool>, DataShapeError> {
        Ok(ctx
            .get(&self.input)
            .iter()
            .map(|v| v.is_some_and(|v| v > self.min && v < self.max))
            .collect())
    }

    fn name(&self) -> &'static str {
        "Within"
    }
}

/// Events with exactly `n` objects.
pub struct CountEqualsNode {
    input: Expr<Objects>,
    n: usize,
}

impl Node for CountEqualsNode {
    type OutputValue = Mask;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![self.input.id()]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<bool>, DataShapeError> {
        Ok(ctx
            .get(&self.input)
            .iter()
            .map(|objects| objects.len() == self.n)
            .collect())
    }

    fn name(&self) -> &'static str {
        "CountEquals"
    }
}

impl Expr<Column> {
    /// Events whose value is strictly above `threshold`.
    pub fn gt(&self, threshold: f64) -> Expr<Mask> {
        self.ctx.register(GreaterThanNode {
            input: self.clone(),
            threshold,
        })
    }
}

impl Expr<OptColumn> {
    /// Events whose value is defined and inside the open interval `(min, max)`.
    pub fn within(&self, min: f64, max: f64) -> Expr<Mask> {
        self.ctx.register(WithinNode {
            input: self.clone(),
            min,
            max,
        })
    }
}

impl Expr<Objects> {
    /// Events with exactly `n` objects.
    pub fn count_eq(&self, n: usize) -> Expr<Mask> {
        self.ctx.register(CountEqualsNode {
            input: self.clone(),
            n,
        })
    }
}
