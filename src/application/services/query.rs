//! Query model handle
//!
//! Owns the live tree and its id allocator. Every public mutation runs to
//! completion and then hands a deep copy of the tree to the observer.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::{normalize, IdAllocator, NodeKind, Tree, TreeArena};

/// Receives a snapshot of the tree after construction and after every
/// mutation call.
pub trait TreeObserver {
    fn on_change(&mut self, tree: Tree);
}

impl<F> TreeObserver for F
where
    F: FnMut(Tree),
{
    fn on_change(&mut self, tree: Tree) {
        self(tree)
    }
}

/// Mutable filter-query model.
///
/// The live tree never leaves this type; callers only ever see snapshots.
/// Mutators take `&mut self` for the whole call, including notification,
/// so an observer cannot re-enter the model.
pub struct QueryBuilder<'a> {
    tree: TreeArena,
    ids: IdAllocator,
    observer: Box<dyn TreeObserver + 'a>,
}

impl<'a> QueryBuilder<'a> {
    /// Builds the model from an optional initial tree and emits the first
    /// snapshot.
    pub fn new(initial: Option<Value>, observer: impl TreeObserver + 'a) -> Self {
        Self::with_allocator(initial, IdAllocator::new(), observer)
    }

    /// Like [`QueryBuilder::new`] with a preconfigured id allocator.
    #[instrument(level = "debug", skip_all)]
    pub fn with_allocator(
        initial: Option<Value>,
        mut ids: IdAllocator,
        observer: impl TreeObserver + 'a,
    ) -> Self {
        let tree = normalize(initial.as_ref(), &mut ids);
        let mut builder = Self {
            tree,
            ids,
            observer: Box::new(observer),
        };
        builder.notify();
        builder
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent_id: &str, kind: NodeKind) {
        self.with_update(|tree, ids| {
            if let Some(id) = tree.add_child(parent_id, kind, ids) {
                debug!(%id, "added");
            }
        });
    }

    #[instrument(level = "debug", skip(self))]
    pub fn modify_field(&mut self, node_id: &str, field: &str, value: &str) {
        self.with_update(|tree, _| {
            tree.modify_field(node_id, field, value);
        });
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, node_id: &str) {
        self.with_update(|tree, _| {
            tree.remove_child(node_id);
        });
    }

    fn with_update<F>(&mut self, op: F)
    where
        F: FnOnce(&mut TreeArena, &mut IdAllocator),
    {
        op(&mut self.tree, &mut self.ids);
        self.notify();
    }

    fn notify(&mut self) {
        let snapshot = self.tree.snapshot();
        self.observer.on_change(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn given_closure_observer_when_constructing_then_receives_initial_snapshot() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _builder = QueryBuilder::new(None, move |tree: Tree| sink.borrow_mut().push(tree));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].id, "g-0");
    }

    #[test]
    fn given_no_op_mutation_when_called_then_still_notifies() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let mut builder = QueryBuilder::new(None, move |_: Tree| *sink.borrow_mut() += 1);
        builder.remove_child("missing");
        builder.modify_field("missing", "value", "x");
        builder.add_child("missing", NodeKind::Rule);
        assert_eq!(*count.borrow(), 4);
    }
}
