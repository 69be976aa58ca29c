//! Outline rendering of snapshots for the terminal.

use termtree::Tree as TermTree;
use tracing::instrument;

use crate::domain::{Group, Node};

pub trait ToTermTree {
    fn to_term_tree(&self) -> TermTree<String>;
}

impl ToTermTree for Group {
    #[instrument(level = "trace", skip(self))]
    fn to_term_tree(&self) -> TermTree<String> {
        let leaves: Vec<_> = self.rules.iter().map(|node| node.to_term_tree()).collect();
        TermTree::new(format!("{} [{}]", self.combinator, self.id)).with_leaves(leaves)
    }
}

impl ToTermTree for Node {
    fn to_term_tree(&self) -> TermTree<String> {
        match self {
            Node::Group(group) => group.to_term_tree(),
            Node::Rule(rule) => TermTree::new(format!(
                "{} {} {} [{}]",
                placeholder(&rule.field),
                placeholder(&rule.operator),
                placeholder(&rule.value),
                rule.id
            )),
        }
    }
}

/// Unset rule attributes render as `_` so columns stay visible.
fn placeholder(s: &str) -> &str {
    if s.is_empty() {
        "_"
    } else {
        s
    }
}
