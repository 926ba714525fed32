//! Bitwise operations for masks in the pipeline DSL.

use std::ops::BitAnd;

use hinv_primitives::DataShapeError;

use crate::engine::EvalContext;
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::value::Mask;

/// Node that performs an element-wise AND of two masks.
pub struct AndMasksNode {
    left: Expr<Mask>,
    right: Expr<Mask>,
}

impl AndMasksNode {
    pub fn new(left: Expr<Mask>, right: Expr<Mask>) -> Self {
        Self { left, right }
    }
}

impl Node for AndMasksNode {
    type OutputValue = Mask;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![self.left.id(), self.right.id()]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<bool>, DataShapeError> {
        let left = ctx.get(&self.left);
        let right = ctx.get(&self.right);
        if left.len() != right.len() {
            return Err(DataShapeError::LengthMismatch {
                field: format!("mask {}", self.right.id()),
                expected: left.len(),
                found: right.len(),
            });
        }
        Ok(left.iter().zip(right).map(|(&l, &r)| l && r).collect())
    }

    fn name(&self) -> &'static str {
        "AndMasks"
    }
}

impl BitAnd for Expr<Mask> {
    type Output = Expr<Mask>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.ctx.register(AndMasksNode::new(self.clone(), rhs))
    }
}

// Also implement for references to avoid moves
impl BitAnd for &Expr<Mask> {
    type Output = Expr<Mask>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.ctx
            .register(AndMasksNode::new(self.clone(), rhs.clone()))
    }
}
