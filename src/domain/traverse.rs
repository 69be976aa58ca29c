//! Breadth-first traversal over the live tree.

use std::collections::VecDeque;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{TreeArena, TreeNode};

impl TreeArena {
    /// Starts a new breadth-first walk from the root.
    ///
    /// Each call is independent. A group's children are read when the group
    /// is dequeued, so the walk sees the child lists as they are at that
    /// moment.
    #[instrument(level = "trace", skip(self))]
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse::new(self)
    }
}

pub struct Traverse<'a> {
    arena: &'a TreeArena,
    queue: VecDeque<Index>,
}

impl<'a> Traverse<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(arena.root());
        Self { arena, queue }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.queue.pop_front() {
            if let Some(node) = self.arena.get_node(current_idx) {
                self.queue.extend(node.children.iter().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::{NodeData, NodePayload};
    use crate::domain::node::{Combinator, NodeKind};

    fn data(id: &str, kind: NodeKind) -> NodeData {
        NodeData {
            id: id.into(),
            payload: NodePayload::empty(kind),
        }
    }

    //      g-0
    //     /   \
    //   g-1   r-0
    //    |
    //   r-1
    #[test]
    fn given_nested_tree_when_traversing_then_yields_level_order() {
        let mut tree = TreeArena::new("g-0".into(), Combinator::And);
        let root = tree.root();
        let g1 = tree.insert_node(data("g-1", NodeKind::Group), root).unwrap();
        tree.insert_node(data("r-0", NodeKind::Rule), root);
        tree.insert_node(data("r-1", NodeKind::Rule), g1);

        let ids: Vec<&str> = tree.traverse().map(|(_, n)| n.data.id.as_str()).collect();
        assert_eq!(ids, vec!["g-0", "g-1", "r-0", "r-1"]);
    }

    #[test]
    fn given_traversal_when_restarted_then_walks_again_from_root() {
        let tree = TreeArena::new("g-0".into(), Combinator::And);
        assert_eq!(tree.traverse().count(), 1);
        assert_eq!(tree.traverse().count(), 1);
    }
}
