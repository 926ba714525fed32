//! Pipeline context for managing the expression graph.
//!
//! The `PipelineContext` is the central registry for all nodes in a pipeline.
//! It allocates node IDs and stores the type-erased nodes. A context is built
//! once per run and then shared read-only by every worker evaluating batches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::expr::Expr;
use crate::node::{Node, NodeId, SharedNode};

/// Central registry for the expression graph.
///
/// It is typically wrapped in an `Arc` for sharing between expressions and
/// between worker threads.
///
/// # Example
///
/// ```ignore
/// let ctx = Arc::new(PipelineContext::new());
/// let met = ScalarColumn::new(&ctx, "MET");  // Registers a node and returns Expr<Column>
/// ```
pub struct PipelineContext {
    nodes: RwLock<HashMap<NodeId, SharedNode>>,
    next_id: AtomicU64,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new node and return a typed expression handle.
    ///
    /// Node IDs are allocated in registration order, so a node can only depend
    /// on nodes with smaller IDs and the graph is acyclic by construction.
    pub fn register<N: Node>(self: &Arc<Self>, node: N) -> Expr<N::OutputValue> {
        let id = NodeId(self.next_id.fetch_add(1, Ordering::SeqCst));

        {
            let mut nodes = self.nodes.write().expect("lock poisoned");
            nodes.insert(id, Arc::new(node));
        }

        Expr::new(id, Arc::clone(self))
    }

    pub fn get_node(&self, id: NodeId) -> Option<SharedNode> {
        let nodes = self.nodes.read().expect("lock poisoned");
        nodes.get(&id).cloned()
    }

    pub fn node_count(&self) -> usize {
        let nodes = self.nodes.read().expect("lock poisoned");
        nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        let nodes = self.nodes.read().expect("lock poisoned");
        nodes.contains_key(&id)
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.nodes.read().expect("lock poisoned");
        f.debug_struct("PipelineContext")
            .field("node_count", &nodes.len())
            .finish()
    }
}
