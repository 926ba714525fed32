//! Source operations for the pipeline DSL.
//!
//! Source nodes produce values straight from the batch rather than
//! transforming other expressions.

use std::sync::Arc;

use hinv_primitives::DataShapeError;

use crate::context::PipelineContext;
use crate::engine::EvalContext;
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::value::{Column, Mask};

/// Node that reads a per-event scalar field from the batch.
pub struct ScalarColumnNode {
    field: String,
}

impl Node for ScalarColumnNode {
    type OutputValue = Column;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<f64>, DataShapeError> {
        Ok(ctx.batch().scalar(&self.field)?.to_vec())
    }

    fn name(&self) -> &'static str {
        "ScalarColumn"
    }
}

pub struct ScalarColumn;

impl ScalarColumn {
    pub fn new(ctx: &Arc<PipelineContext>, field: impl Into<String>) -> Expr<Column> {
        ctx.register(ScalarColumnNode {
            field: field.into(),
        })
    }
}

/// Node that passes every event; the "no cuts applied" stage.
pub struct AllEventsNode;

impl Node for AllEventsNode {
    type OutputValue = Mask;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<bool>, DataShapeError> {
        Ok(vec![true; ctx.n_events()])
    }

    fn name(&self) -> &'static str {
        "AllEvents"
    }
}

pub struct AllEvents;

impl AllEvents {
    pub fn new(ctx: &Arc<PipelineContext>) -> Expr<Mask> {
        ctx.register(AllEventsNode)
    }
}
