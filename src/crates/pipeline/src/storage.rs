//! Segregated storage for node evaluation results.
//!
//! `NodeStorage` keeps one slot per evaluated node. Results are stored
//! type-erased but retrieved with type safety through the `Expr<T>` handle.
//! A storage lives exactly as long as the evaluation of one batch.

use std::any::Any;
use std::collections::HashMap;

use crate::node::NodeId;
use crate::value::ExprValue;

#[derive(Default)]
pub struct NodeStorage {
    slots: HashMap<NodeId, Box<dyn Any + Send + Sync>>,
}

impl NodeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, value: Box<dyn Any + Send + Sync>) {
        self.slots.insert(id, value);
    }

    /// Returns `None` if the node hasn't been evaluated yet or if the type
    /// doesn't match.
    pub fn get<T: ExprValue>(&self, id: NodeId) -> Option<&T::Output> {
        self.slots
            .get(&id)
            .and_then(|boxed| boxed.as_ref().downcast_ref::<T::Output>())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for NodeStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStorage")
            .field("slot_count", &self.slots.len())
            .finish()
    }
}
