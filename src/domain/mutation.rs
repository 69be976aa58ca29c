//! Add, modify and remove operations on the live tree.
//!
//! Every operation scans in breadth-first order and acts on the first
//! qualifying node only. A missing target is a silent no-op; the return
//! values exist for logging and tests.

use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, NodePayload, TreeArena};
use crate::domain::identity::IdAllocator;
use crate::domain::node::{Attribute, Combinator, NodeKind};

impl TreeArena {
    /// Appends an empty node of `kind` to the first group with id `parent_id`.
    ///
    /// Returns the new node's id. Rules sharing `parent_id` are skipped.
    #[instrument(level = "debug", skip(self, ids))]
    pub fn add_child(
        &mut self,
        parent_id: &str,
        kind: NodeKind,
        ids: &mut IdAllocator,
    ) -> Option<String> {
        let Some(parent) = self
            .traverse()
            .find(|(_, node)| node.data.is_group() && node.data.id == parent_id)
            .map(|(idx, _)| idx)
        else {
            debug!("no group with this id, nothing added");
            return None;
        };

        let id = ids.allocate(kind);
        let data = NodeData {
            id: id.clone(),
            payload: NodePayload::empty(kind),
        };
        self.insert_node(data, parent).map(|_| id)
    }

    /// Overwrites `field` on the first node with id `node_id` that carries it.
    ///
    /// Only `combinator`, `field`, `operator` and `value` are editable. A
    /// combinator other than `AND`/`OR` leaves the group unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn modify_field(&mut self, node_id: &str, field: &str, value: &str) -> bool {
        let Ok(attribute) = field.parse::<Attribute>() else {
            debug!("not an editable attribute, nothing modified");
            return false;
        };
        let Some(target) = self
            .traverse()
            .find(|(_, node)| node.data.id == node_id && node.data.kind() == attribute.owner())
            .map(|(idx, _)| idx)
        else {
            debug!("no node carrying this attribute, nothing modified");
            return false;
        };
        let Some(node) = self.get_node_mut(target) else {
            return false;
        };

        match (&mut node.data.payload, attribute) {
            (NodePayload::Group { combinator }, Attribute::Combinator) => {
                match value.parse::<Combinator>() {
                    Ok(parsed) => *combinator = parsed,
                    Err(e) => {
                        debug!(error = %e, "combinator unchanged");
                        return false;
                    }
                }
            }
            (NodePayload::Rule { field, .. }, Attribute::Field) => *field = value.to_string(),
            (NodePayload::Rule { operator, .. }, Attribute::Operator) => {
                *operator = value.to_string()
            }
            (NodePayload::Rule { value: current, .. }, Attribute::Value) => {
                *current = value.to_string()
            }
            _ => return false,
        }
        true
    }

    /// Splices the node with id `node_id` out of the first group that lists
    /// it as a direct child. Its subtree goes with it.
    ///
    /// The root has no parent and is therefore never removed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, node_id: &str) -> bool {
        let target = self.traverse().find_map(|(parent_idx, parent)| {
            parent
                .children
                .iter()
                .copied()
                .find(|&child| {
                    self.get_node(child)
                        .is_some_and(|child| child.data.id == node_id)
                })
                .map(|child| (parent_idx, child))
        });

        match target {
            Some((parent, child)) => self.detach(parent, child),
            None => {
                debug!("no group lists this id as a child, nothing removed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Node;
    use generational_arena::Index;

    fn setup() -> (TreeArena, IdAllocator) {
        let mut ids = IdAllocator::new();
        let tree = TreeArena::new(ids.allocate(NodeKind::Group), Combinator::And);
        (tree, ids)
    }

    fn insert(tree: &mut TreeArena, parent: Index, id: &str, kind: NodeKind) -> Index {
        let data = NodeData {
            id: id.into(),
            payload: NodePayload::empty(kind),
        };
        tree.insert_node(data, parent).unwrap()
    }

    //        g-0
    //       /   \
    //    dup     dup
    //     |       |
    //   twin     twin
    fn tree_with_duplicate_ids() -> (TreeArena, IdAllocator, Index, Index) {
        let (mut tree, ids) = setup();
        let root = tree.root();
        let first = insert(&mut tree, root, "dup", NodeKind::Group);
        let second = insert(&mut tree, root, "dup", NodeKind::Group);
        insert(&mut tree, first, "twin", NodeKind::Rule);
        insert(&mut tree, second, "twin", NodeKind::Rule);
        (tree, ids, first, second)
    }

    #[test]
    fn given_duplicate_group_ids_when_adding_then_only_first_in_level_order_grows() {
        let (mut tree, mut ids, first, second) = tree_with_duplicate_ids();

        assert!(tree.add_child("dup", NodeKind::Rule, &mut ids).is_some());

        assert_eq!(tree.children(first).len(), 2);
        assert_eq!(tree.children(second).len(), 1);
    }

    #[test]
    fn given_duplicate_rule_ids_when_modifying_then_only_first_changes() {
        let (mut tree, _, first, second) = tree_with_duplicate_ids();

        assert!(tree.modify_field("twin", "value", "42"));

        let value_of = |group: Index| {
            let rule = tree.get_node(tree.children(group)[0]).unwrap();
            match &rule.data.payload {
                NodePayload::Rule { value, .. } => value.clone(),
                other => panic!("expected rule, got {:?}", other),
            }
        };
        assert_eq!(value_of(first), "42");
        assert_eq!(value_of(second), "");
    }

    #[test]
    fn given_duplicate_ids_when_removing_then_exactly_one_spliced() {
        let (mut tree, _, first, second) = tree_with_duplicate_ids();
        let before = tree.len();

        assert!(tree.remove_child("twin"));
        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second).len(), 1);
        assert_eq!(tree.len(), before - 1);

        assert!(tree.remove_child("dup"));
        assert_eq!(tree.children(tree.root()), &[second]);
    }

    #[test]
    fn given_root_when_adding_rule_then_appended_with_fresh_id() {
        let (mut tree, mut ids) = setup();
        assert_eq!(tree.add_child("g-0", NodeKind::Rule, &mut ids).as_deref(), Some("r-0"));
        assert_eq!(tree.add_child("g-0", NodeKind::Group, &mut ids).as_deref(), Some("g-1"));

        let snapshot = tree.snapshot();
        let ids: Vec<&str> = snapshot.rules.iter().map(Node::id).collect();
        assert_eq!(ids, vec!["r-0", "g-1"]);
    }

    #[test]
    fn given_rule_id_when_adding_then_nothing_added() {
        let (mut tree, mut ids) = setup();
        tree.add_child("g-0", NodeKind::Rule, &mut ids);
        assert!(tree.add_child("r-0", NodeKind::Rule, &mut ids).is_none());
        assert_eq!(tree.len(), 2);
        // no id was consumed
        assert_eq!(ids.peek(NodeKind::Rule), 1);
    }

    #[test]
    fn given_rule_when_modifying_value_then_only_value_changes() {
        let (mut tree, mut ids) = setup();
        tree.add_child("g-0", NodeKind::Rule, &mut ids);
        assert!(tree.modify_field("r-0", "value", "42"));

        match &tree.snapshot().rules[0] {
            Node::Rule(rule) => {
                assert_eq!(rule.value, "42");
                assert_eq!(rule.field, "");
                assert_eq!(rule.operator, "");
            }
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn given_attribute_of_other_kind_when_modifying_then_no_op() {
        let (mut tree, mut ids) = setup();
        tree.add_child("g-0", NodeKind::Rule, &mut ids);
        assert!(!tree.modify_field("g-0", "value", "x"));
        assert!(!tree.modify_field("r-0", "combinator", "OR"));
        assert!(!tree.modify_field("r-0", "id", "r-99"));
    }

    #[test]
    fn given_invalid_combinator_when_modifying_then_group_unchanged() {
        let (mut tree, _) = setup();
        assert!(!tree.modify_field("g-0", "combinator", ""));
        assert!(tree.modify_field("g-0", "combinator", "OR"));
        assert_eq!(tree.snapshot().combinator, Combinator::Or);
    }

    #[test]
    fn given_root_id_when_removing_then_no_op() {
        let (mut tree, _) = setup();
        assert!(!tree.remove_child("g-0"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn given_middle_child_when_removing_then_order_of_rest_kept() {
        let (mut tree, mut ids) = setup();
        for _ in 0..3 {
            tree.add_child("g-0", NodeKind::Rule, &mut ids);
        }
        assert!(tree.remove_child("r-1"));
        let snapshot = tree.snapshot();
        let ids: Vec<&str> = snapshot.rules.iter().map(Node::id).collect();
        assert_eq!(ids, vec!["r-0", "r-2"]);
    }
}
