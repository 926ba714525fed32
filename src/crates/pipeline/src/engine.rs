//! Lazy evaluation engine for the pipeline DSL.
//!
//! An `Engine` is bound to one batch. It is responsible for:
//! - Lazy evaluation of expressions against that batch
//! - Caching results so shared sub-expressions run once per batch
//! - Dependency resolution and topological ordering
//!
//! Engines never outlive their batch, so nothing computed for one batch can be
//! observed while evaluating another.

use std::collections::HashSet;
use std::sync::Arc;

use hinv_primitives::{DataShapeError, EventBatch};
use log::trace;

use crate::context::PipelineContext;
use crate::expr::Expr;
use crate::node::NodeId;
use crate::storage::NodeStorage;
use crate::value::ExprValue;

/// Context passed to nodes during evaluation.
///
/// Provides access to:
/// - The batch under evaluation
/// - Results of dependency nodes
pub struct EvalContext<'a> {
    pub(crate) storage: &'a NodeStorage,
    pub(crate) batch: &'a EventBatch,
    /// Node id of the node being evaluated.
    pub(crate) node_id: NodeId,
}

impl<'a> EvalContext<'a> {
    pub fn new(storage: &'a NodeStorage, batch: &'a EventBatch, node_id: NodeId) -> Self {
        Self {
            storage,
            batch,
            node_id,
        }
    }

    pub fn batch(&self) -> &EventBatch {
        self.batch
    }

    pub fn n_events(&self) -> usize {
        self.batch.len()
    }

    /// Get the result of a dependency expression.
    ///
    /// # Panics
    ///
    /// Panics if the dependency hasn't been evaluated yet. The engine
    /// ensures dependencies are evaluated before their dependents.
    pub fn get<T: ExprValue>(&self, expr: &Expr<T>) -> &T::Output {
        self.storage.get::<T>(expr.id()).unwrap_or_else(|| {
            panic!(
                "Dependency {} of {} not evaluated - this is a bug in the engine",
                expr.id(),
                self.node_id
            )
        })
    }
}

/// Evaluates expressions of a shared [`PipelineContext`] against one batch.
pub struct Engine<'a> {
    ctx: Arc<PipelineContext>,
    storage: NodeStorage,
    batch: &'a EventBatch,
}

impl<'a> Engine<'a> {
    pub fn new(ctx: Arc<PipelineContext>, batch: &'a EventBatch) -> Self {
        Self {
            ctx,
            storage: NodeStorage::new(),
            batch,
        }
    }

    pub fn batch(&self) -> &EventBatch {
        self.batch
    }

    /// Evaluate an expression (and whatever it depends on) and borrow the
    /// cached result.
    pub fn eval_ref<T: ExprValue>(&mut self, expr: &Expr<T>) -> Result<&T::Output, DataShapeError> {
        self.evaluate(expr.id())?;
        self.storage
            .get::<T>(expr.id())
            .ok_or(DataShapeError::NodeType {
                node: std::any::type_name::<T>(),
            })
    }

    /// Evaluate an expression and return an owned copy of the result.
    pub fn eval<T: ExprValue>(&mut self, expr: &Expr<T>) -> Result<T::Output, DataShapeError> {
        self.eval_ref(expr).cloned()
    }

    fn evaluate(&mut self, root: NodeId) -> Result<(), DataShapeError> {
        if self.storage.contains(root) {
            return Ok(());
        }
        for id in self.topological_sort(root) {
            if self.storage.contains(id) {
                continue;
            }
            let node = self
                .ctx
                .get_node(id)
                .unwrap_or_else(|| panic!("Node should always be registered: {id}"));
            let eval_ctx = EvalContext::new(&self.storage, self.batch, id);
            let result = node.evaluate_any(&eval_ctx)?;
            trace!("evaluated {} ({id})", node.name());
            self.storage.insert(id, result);
        }
        Ok(())
    }

    /// Post-order of the not-yet-evaluated part of the graph below `root`.
    fn topological_sort(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();

        fn visit(
            id: NodeId,
            ctx: &PipelineContext,
            storage: &NodeStorage,
            visited: &mut HashSet<NodeId>,
            result: &mut Vec<NodeId>,
        ) {
            if !visited.insert(id) || storage.contains(id) {
                return;
            }
            if let Some(node) = ctx.get_node(id) {
                for dep_id in node.dependencies() {
                    visit(dep_id, ctx, storage, visited, result);
                }
            }
            result.push(id);
        }

        visit(root, &self.ctx, &self.storage, &mut visited, &mut result);
        result
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("context", &self.ctx)
            .field("storage", &self.storage)
            .field("dataset", &self.batch.dataset())
            .finish()
    }
}
