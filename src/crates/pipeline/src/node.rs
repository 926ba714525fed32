//! Node trait and related types for the pipeline DSL.
//!
//! This module defines the core `Node` trait that all expression nodes must
//! implement, the `NodeId` type for identifying nodes and the `AnyNode` trait
//! for type-erased storage.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hinv_primitives::DataShapeError;

use crate::engine::EvalContext;
use crate::value::ExprValue;

/// Unique identifier for a node in the expression graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Core trait for expression nodes.
///
/// Any struct can become an expression node by implementing this trait. This
/// is the extension point the selection crate uses to add object selection
/// and mass reconstruction to the DSL.
///
/// # Example
///
/// ```ignore
/// pub struct MetAboveNode {
///     met: Expr<Column>,
///     threshold: f64,
/// }
///
/// impl Node for MetAboveNode {
///     type OutputValue = Mask;
///
///     fn dependencies(&self) -> Vec<NodeId> {
///         vec![self.met.id()]
///     }
///
///     fn evaluate(&self, ctx: &EvalContext) -> Result<Vec<bool>, DataShapeError> {
///         Ok(ctx.get(&self.met).iter().map(|&v| v > self.threshold).collect())
///     }
/// }
/// ```
pub trait Node: Send + Sync + 'static {
    /// The value type this node produces when evaluated.
    type OutputValue: ExprValue;

    /// IDs of the nodes this node reads. The engine evaluates them first.
    fn dependencies(&self) -> Vec<NodeId>;

    /// Evaluate this node given access to the batch and dependency results.
    ///
    /// Fails only when the batch does not have the shape the node needs.
    fn evaluate(
        &self,
        ctx: &EvalContext<'_>,
    ) -> Result<<Self::OutputValue as ExprValue>::Output, DataShapeError>;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased wrapper for nodes, allowing storage of heterogeneous nodes.
///
/// Automatically implemented for all `Node` types.
pub trait AnyNode: Send + Sync + 'static {
    fn dependencies(&self) -> Vec<NodeId>;

    fn evaluate_any(
        &self,
        ctx: &EvalContext<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>, DataShapeError>;

    fn name(&self) -> &'static str;
}

impl<N: Node> AnyNode for N {
    fn dependencies(&self) -> Vec<NodeId> {
        Node::dependencies(self)
    }

    fn evaluate_any(
        &self,
        ctx: &EvalContext<'_>,
    ) -> Result<Box<dyn Any + Send + Sync>, DataShapeError> {
        let value = self.evaluate(ctx)?;
        Ok(Box::new(value))
    }

    fn name(&self) -> &'static str {
        Node::name(self)
    }
}

/// A shared reference to a type-erased node.
pub type SharedNode = Arc<dyn AnyNode>;
