use std::sync::Arc;

use hinv_pipeline::engine::EvalContext;
use hinv_pipeline::expr::Expr;
use hinv_pipeline::node::{Node, NodeId};
use hinv_pipeline::{Objects, PipelineContext};
use hinv_primitives::{DataShapeError, ObjectKind, ObjectThresholds, ParticleCollection};

use crate::objects::ObjectSelector;

/// Node producing the accepted objects of one kind for every event.
pub struct SelectObjectsNode {
    selector: ObjectSelector,
}

impl SelectObjectsNode {
    pub fn new(selector: ObjectSelector) -> Self {
        Self { selector }
    }
}

impl Node for SelectObjectsNode {
    type OutputValue = Objects;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<ParticleCollection>, DataShapeError> {
        self.selector.select(ctx.batch())
    }

    fn name(&self) -> &'static str {
        match self.selector.kind() {
            ObjectKind::Muon => "SelectMuons",
            ObjectKind::Electron => "SelectElectrons",
            ObjectKind::Jet => "SelectJets",
        }
    }
}

/// Factory for object-selection expressions.
pub struct SelectObjects;

impl SelectObjects {
    pub fn new(
        ctx: &Arc<PipelineContext>,
        kind: ObjectKind,
        thresholds: ObjectThresholds,
    ) -> Expr<Objects> {
        ctx.register(SelectObjectsNode::new(ObjectSelector::new(kind, thresholds)))
    }
}
