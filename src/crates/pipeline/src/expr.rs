//! Typed expression handles for the pipeline DSL.
//!
//! `Expr<T>` is a type-safe handle to a node in the expression graph. The type
//! parameter `T` indicates what kind of per-event value the expression
//! produces.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::PipelineContext;
use crate::node::NodeId;
use crate::value::ExprValue;

/// A typed handle to a node in the expression graph.
///
/// Building an expression registers a node but computes nothing. Values only
/// exist once an [`Engine`](crate::Engine) evaluates the expression against a
/// batch, so the same graph can be evaluated for any number of batches.
///
/// # Cloning
///
/// `Expr` is cheap to clone: it holds a `NodeId` and an `Arc` to the context.
///
/// # Example
///
/// ```ignore
/// let met: Expr<Column> = ScalarColumn::new(&ctx, "MET");
/// let met_cut: Expr<Mask> = met.gt(100.0);
/// let sr = &two_muons & &met_cut;
/// ```
pub struct Expr<T: ExprValue> {
    pub(crate) id: NodeId,
    pub(crate) ctx: Arc<PipelineContext>,
    pub(crate) _marker: PhantomData<T>,
}

impl<T: ExprValue> Expr<T> {
    /// Typically called by `PipelineContext::register`, not directly by users.
    pub(crate) fn new(id: NodeId, ctx: Arc<PipelineContext>) -> Self {
        Self {
            id,
            ctx,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }
}

impl<T: ExprValue> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            ctx: Arc::clone(&self.ctx),
            _marker: PhantomData,
        }
    }
}

impl<T: ExprValue> std::fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expr")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

// Two expressions are equal if they refer to the same node
impl<T: ExprValue> PartialEq for Expr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ExprValue> Eq for Expr<T> {}

impl<T: ExprValue> std::hash::Hash for Expr<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
