use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::{Combinator, Group, Node, NodeKind, Rule, Tree};

/// Kind-specific attributes of a live node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Group {
        combinator: Combinator,
    },
    Rule {
        field: String,
        operator: String,
        value: String,
    },
}

impl NodePayload {
    /// Defaults for a freshly added node of `kind`.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Group => NodePayload::Group {
                combinator: Combinator::And,
            },
            NodeKind::Rule => NodePayload::Rule {
                field: String::new(),
                operator: String::new(),
                value: String::new(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Group { .. } => NodeKind::Group,
            NodePayload::Rule { .. } => NodeKind::Rule,
        }
    }
}

/// Data payload for tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: String,
    pub payload: NodePayload,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn is_group(&self) -> bool {
        self.kind() == NodeKind::Group
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Direct children in display order; always empty for rules
    pub children: Vec<Index>,
}

/// Arena-backed live query tree.
///
/// The root is always a group and is never removed. Removing a node frees
/// its whole subtree; generational indices keep stale handles from
/// resolving to a reused slot.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Index,
}

impl TreeArena {
    pub fn new(root_id: String, combinator: Combinator) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            data: NodeData {
                id: root_id,
                payload: NodePayload::Group { combinator },
            },
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    /// Appends `data` as the last child of `parent`.
    ///
    /// Returns None if `parent` is not a live group.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Index) -> Option<Index> {
        match self.arena.get(parent) {
            Some(node) if node.data.is_group() => {}
            _ => return None,
        }
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        Some(node_idx)
    }

    /// Splices `child` out of `parent`'s children and frees its subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, parent: Index, child: Index) -> bool {
        let Some(parent_node) = self.arena.get_mut(parent) else {
            return false;
        };
        let Some(position) = parent_node.children.iter().position(|&c| c == child) else {
            return false;
        };
        parent_node.children.remove(position);

        let mut pending = vec![child];
        while let Some(idx) = pending.pop() {
            if let Some(node) = self.arena.remove(idx) {
                pending.extend(node.children);
            }
        }
        true
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Deep, independent copy of the live tree in interchange form.
    ///
    /// Built bottom-up without recursion: children come after their parent
    /// in level order, so walking that order backwards finds every child
    /// already converted.
    #[instrument(level = "trace", skip(self))]
    pub fn snapshot(&self) -> Tree {
        let order: Vec<Index> = self.traverse().map(|(idx, _)| idx).collect();
        let mut built: HashMap<Index, Node> = HashMap::with_capacity(order.len());

        for &idx in order.iter().rev() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let id = node.data.id.clone();
            let converted = match &node.data.payload {
                NodePayload::Group { combinator } => Node::Group(Group {
                    id,
                    combinator: *combinator,
                    rules: node
                        .children
                        .iter()
                        .filter_map(|child| built.remove(child))
                        .collect(),
                }),
                NodePayload::Rule {
                    field,
                    operator,
                    value,
                } => Node::Rule(Rule {
                    id,
                    field: field.clone(),
                    operator: operator.clone(),
                    value: value.clone(),
                }),
            };
            built.insert(idx, converted);
        }

        match built.remove(&self.root) {
            Some(Node::Group(group)) => group,
            // The root slot always holds a group; this arm is unreachable
            // for trees built through this type.
            _ => Group {
                id: String::new(),
                combinator: Combinator::And,
                rules: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> NodeData {
        NodeData {
            id: id.into(),
            payload: NodePayload::empty(NodeKind::Rule),
        }
    }

    #[test]
    fn given_rule_parent_when_inserting_then_refused() {
        let mut tree = TreeArena::new("g-0".into(), Combinator::And);
        let r = tree.insert_node(rule("r-0"), tree.root()).unwrap();
        assert!(tree.insert_node(rule("r-1"), r).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_nested_group_when_detached_then_whole_subtree_freed() {
        let mut tree = TreeArena::new("g-0".into(), Combinator::And);
        let root = tree.root();
        let g = tree
            .insert_node(
                NodeData {
                    id: "g-1".into(),
                    payload: NodePayload::empty(NodeKind::Group),
                },
                root,
            )
            .unwrap();
        let inner = tree.insert_node(rule("r-0"), g).unwrap();

        assert!(tree.detach(root, g));
        assert_eq!(tree.len(), 1);
        assert!(tree.get_node(inner).is_none());
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn given_tree_when_snapshotting_then_children_keep_order() {
        let mut tree = TreeArena::new("g-0".into(), Combinator::Or);
        let root = tree.root();
        tree.insert_node(rule("r-0"), root);
        tree.insert_node(rule("r-1"), root);
        let snapshot = tree.snapshot();
        assert_eq!(snapshot.combinator, Combinator::Or);
        let ids: Vec<&str> = snapshot.rules.iter().map(Node::id).collect();
        assert_eq!(ids, vec!["r-0", "r-1"]);
    }

    #[test]
    fn given_deep_chain_of_groups_when_snapshotting_then_every_level_present() {
        let mut tree = TreeArena::new("g-0".into(), Combinator::And);
        let mut parent = tree.root();
        for level in 1..=3_000 {
            let data = NodeData {
                id: format!("g-{}", level),
                payload: NodePayload::empty(NodeKind::Group),
            };
            parent = tree.insert_node(data, parent).unwrap();
        }

        let snapshot = tree.snapshot();

        let mut depth = 0;
        let mut current = &snapshot;
        while let Some(Node::Group(child)) = current.rules.first() {
            depth += 1;
            current = child;
        }
        assert_eq!(depth, 3_000);
        assert_eq!(current.id, "g-3000");
    }
}
