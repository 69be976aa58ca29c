//! Turns an externally supplied tree into a well-formed live tree.
//!
//! A candidate is accepted only if every node passes the shape check.
//! Anything else is replaced by a single empty `AND` group; the failure is
//! logged, never returned.

use std::collections::VecDeque;

use generational_arena::Index;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::domain::arena::{NodeData, NodePayload, TreeArena};
use crate::domain::error::DomainError;
use crate::domain::identity::IdAllocator;
use crate::domain::node::{Combinator, NodeKind};

/// Normalizes `candidate`, falling back to a fresh tree when it is absent or
/// malformed.
///
/// Ids are assigned in breadth-first order and overwrite any ids in the
/// input. Ids allocated before a failure are not returned to `ids`, so the
/// fallback root may skip numbers.
#[instrument(level = "debug", skip_all)]
pub fn normalize(candidate: Option<&Value>, ids: &mut IdAllocator) -> TreeArena {
    let Some(candidate) = candidate else {
        debug!("no initial tree, creating empty root");
        return fresh_tree(ids);
    };
    match adopt(candidate, ids) {
        Ok(tree) => {
            debug!(nodes = tree.len(), "adopted initial tree");
            tree
        }
        Err(e) => {
            warn!(reason = %e, "discarding malformed initial tree");
            fresh_tree(ids)
        }
    }
}

/// Single empty `AND` group with a newly allocated id.
pub fn fresh_tree(ids: &mut IdAllocator) -> TreeArena {
    TreeArena::new(ids.allocate(NodeKind::Group), Combinator::And)
}

fn adopt(candidate: &Value, ids: &mut IdAllocator) -> Result<TreeArena, DomainError> {
    let mut tree: Option<TreeArena> = None;
    let mut queue: VecDeque<(&Value, Option<Index>)> = VecDeque::new();
    queue.push_back((candidate, None));
    let mut position = 0;

    while let Some((value, parent)) = queue.pop_front() {
        let payload = check_node(value, position)?;
        let kind = payload.kind();
        if parent.is_none() && kind == NodeKind::Rule {
            return Err(DomainError::RootIsRule);
        }

        let data = NodeData {
            id: ids.allocate(kind),
            payload,
        };
        let idx = match parent {
            Some(parent) => tree
                .as_mut()
                .and_then(|tree| tree.insert_node(data, parent))
                .ok_or(DomainError::Orphan { position })?,
            None => {
                let NodePayload::Group { combinator } = data.payload else {
                    return Err(DomainError::RootIsRule);
                };
                let root = TreeArena::new(data.id, combinator);
                let idx = root.root();
                tree = Some(root);
                idx
            }
        };

        if let Some(Value::Array(children)) = value.get("rules") {
            queue.extend(children.iter().map(|child| (child, Some(idx))));
        }
        position += 1;
    }

    tree.ok_or(DomainError::RootIsRule)
}

/// Classifies and validates one candidate node.
///
/// An object with a `rules` key is a group and needs a `rules` list and a
/// known `combinator`. Any other object is a rule and needs string
/// `field`, `value` and `operator` entries. `position` is the node's index
/// in breadth-first order and only feeds the error.
pub fn check_node(value: &Value, position: usize) -> Result<NodePayload, DomainError> {
    let object = value
        .as_object()
        .ok_or(DomainError::NotAnObject { position })?;

    if object.contains_key("rules") {
        if !object["rules"].is_array() {
            return Err(DomainError::RulesNotAList { position });
        }
        let combinator = string_entry(object, NodeKind::Group, "combinator", position)?;
        Ok(NodePayload::Group {
            combinator: combinator.parse()?,
        })
    } else {
        Ok(NodePayload::Rule {
            field: string_entry(object, NodeKind::Rule, "field", position)?.to_string(),
            value: string_entry(object, NodeKind::Rule, "value", position)?.to_string(),
            operator: string_entry(object, NodeKind::Rule, "operator", position)?.to_string(),
        })
    }
}

fn string_entry<'a>(
    object: &'a Map<String, Value>,
    kind: NodeKind,
    key: &'static str,
    position: usize,
) -> Result<&'a str, DomainError> {
    let value = object.get(key).ok_or(DomainError::MissingKey {
        kind,
        key,
        position,
    })?;
    value.as_str().ok_or(DomainError::NotAString {
        kind,
        key,
        position,
    })
}
