use hinv_pipeline::engine::EvalContext;
use hinv_pipeline::expr::Expr;
use hinv_pipeline::node::{Node, NodeId};
use hinv_pipeline::{Mask, Objects, OptColumn};
use hinv_primitives::{DataShapeError, invariant_mass};

/// Node computing the invariant mass of each event's objects, but only for
/// events passing `gate`.
///
/// Events failing the gate get `None`, which fails any later window test. The
/// result stays aligned with the full batch.
pub struct GatedMassNode {
    objects: Expr<Objects>,
    gate: Expr<Mask>,
}

impl GatedMassNode {
    pub fn new(objects: Expr<Objects>, gate: Expr<Mask>) -> Self {
        Self { objects, gate }
    }
}

impl Node for GatedMassNode {
    type OutputValue = OptColumn;

    fn dependencies(&self) -> Vec<NodeId> {
        vec![self.objects.id(), self.gate.id()]
    }

    fn evaluate(&self, ctx: &EvalContext<'_>) -> Result<Vec<Option<f64>>, DataShapeError> {
        let objects = ctx.get(&self.objects);
        let gate = ctx.get(&self.gate);
        if objects.len() != gate.len() {
            return Err(DataShapeError::LengthMismatch {
                field: format!("mass gate {}", self.gate.id()),
                expected: objects.len(),
                found: gate.len(),
            });
        }

        Ok(objects
            .iter()
            .zip(gate)
            .map(|(objects, &pass)| if pass { invariant_mass(objects) } else { None })
            .collect())
    }

    fn name(&self) -> &'static str {
        "GatedMass"
    }
}

/// Factory for gated invariant-mass expressions.
pub struct GatedMass;

impl GatedMass {
    /// Mass of `objects` for the events selected by `gate`.
    pub fn new(objects: &Expr<Objects>, gate: &Expr<Mask>) -> Expr<OptColumn> {
        let ctx = objects.context().clone();
        ctx.register(GatedMassNode::new(objects.clone(), gate.clone()))
    }
}
