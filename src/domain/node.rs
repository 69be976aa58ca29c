//! Node payloads and the plain interchange shape of a query tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Logical combination applied to the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Combinator {
    pub const ALL: [Combinator; 2] = [Combinator::And, Combinator::Or];

    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Combinator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            other => Err(DomainError::InvalidCombinator(other.to_string())),
        }
    }
}

/// Discriminant of the two node shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Rule,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Rule => "rule",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(NodeKind::Group),
            "rule" => Ok(NodeKind::Rule),
            other => Err(DomainError::UnknownKind(other.to_string())),
        }
    }
}

/// Attributes a caller may overwrite on an existing node.
///
/// `id` and `rules` are structural and never editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Combinator,
    Field,
    Operator,
    Value,
}

impl Attribute {
    /// Kind of node that carries this attribute.
    pub fn owner(&self) -> NodeKind {
        match self {
            Attribute::Combinator => NodeKind::Group,
            Attribute::Field | Attribute::Operator | Attribute::Value => NodeKind::Rule,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Combinator => "combinator",
            Attribute::Field => "field",
            Attribute::Operator => "operator",
            Attribute::Value => "value",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "combinator" => Ok(Attribute::Combinator),
            "field" => Ok(Attribute::Field),
            "operator" => Ok(Attribute::Operator),
            "value" => Ok(Attribute::Value),
            other => Err(DomainError::UnknownAttribute(other.to_string())),
        }
    }
}

/// Interchange form of a group.
///
/// Interchange values nest one level per group, so serialising, rendering
/// or dropping them uses stack in proportion to the tree's depth. The live
/// tree and its snapshot construction do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub combinator: Combinator,
    pub rules: Vec<Node>,
}

/// Interchange form of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub field: String,
    pub operator: String,
    pub value: String,
}

/// Interchange node: serialises to exactly the group or rule object, no tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Group(Group),
    Rule(Rule),
}

/// A complete tree is its root group.
pub type Tree = Group;

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Group(group) => &group.id,
            Node::Rule(rule) => &rule.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::Rule(_) => NodeKind::Rule,
        }
    }
}

impl Group {
    /// Ids of this group and all descendants, breadth-first.
    pub fn ids(&self) -> Vec<String> {
        let mut ids = vec![self.id.clone()];
        let mut queue: std::collections::VecDeque<&Node> = self.rules.iter().collect();
        while let Some(node) = queue.pop_front() {
            ids.push(node.id().to_string());
            if let Node::Group(group) = node {
                queue.extend(group.rules.iter());
            }
        }
        ids
    }

    /// Finds the first node with `id`, breadth-first, starting with this
    /// group itself.
    pub fn find(&self, id: &str) -> Option<Node> {
        if self.id == id {
            return Some(Node::Group(self.clone()));
        }
        let mut queue: std::collections::VecDeque<&Node> = self.rules.iter().collect();
        while let Some(node) = queue.pop_front() {
            if node.id() == id {
                return Some(node.clone());
            }
            if let Node::Group(group) = node {
                queue.extend(group.rules.iter());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        Group {
            id: "g-0".into(),
            combinator: Combinator::Or,
            rules: vec![
                Node::Rule(Rule {
                    id: "r-0".into(),
                    field: "twitter".into(),
                    operator: ">".into(),
                    value: "x".into(),
                }),
                Node::Group(Group {
                    id: "g-1".into(),
                    combinator: Combinator::And,
                    rules: vec![],
                }),
            ],
        }
    }

    #[test]
    fn given_tree_when_serialised_then_has_plain_untagged_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "g-0",
                "combinator": "OR",
                "rules": [
                    { "id": "r-0", "field": "twitter", "operator": ">", "value": "x" },
                    { "id": "g-1", "combinator": "AND", "rules": [] }
                ]
            })
        );
    }

    #[test]
    fn given_serialised_tree_when_deserialised_then_restores_node_kinds() {
        let text = serde_json::to_string(&sample()).unwrap();
        let back: Tree = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample());
        assert_eq!(back.rules[0].kind(), NodeKind::Rule);
        assert_eq!(back.rules[1].kind(), NodeKind::Group);
    }

    #[test]
    fn given_tree_when_collecting_ids_then_breadth_first() {
        assert_eq!(sample().ids(), vec!["g-0", "r-0", "g-1"]);
    }

    #[test]
    fn given_shared_id_at_two_depths_when_finding_then_shallower_wins() {
        let mut tree = sample();
        if let Node::Group(inner) = &mut tree.rules[1] {
            inner.rules.push(Node::Group(Group {
                id: "dup".into(),
                combinator: Combinator::And,
                rules: vec![],
            }));
        }
        tree.rules.push(Node::Rule(Rule {
            id: "dup".into(),
            field: "name".into(),
            operator: "=".into(),
            value: "bob".into(),
        }));

        let found = tree.find("dup").unwrap();
        assert_eq!(found.kind(), NodeKind::Rule);
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn given_lowercase_combinator_when_parsing_then_rejected() {
        assert!("and".parse::<Combinator>().is_err());
        assert_eq!("OR".parse::<Combinator>().unwrap(), Combinator::Or);
    }

    #[test]
    fn given_structural_key_when_parsing_attribute_then_rejected() {
        assert!("id".parse::<Attribute>().is_err());
        assert!("rules".parse::<Attribute>().is_err());
        assert_eq!("value".parse::<Attribute>().unwrap().owner(), NodeKind::Rule);
    }
}
