//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeKind;

/// Reasons a value is not a well-formed query node.
///
/// The model never surfaces these to its caller: the normalizer consumes
/// them to decide on its fallback, and the CLI uses the string parsers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node at position {position} is not an object")]
    NotAnObject { position: usize },

    #[error("{kind} at position {position} is missing `{key}`")]
    MissingKey {
        kind: NodeKind,
        key: &'static str,
        position: usize,
    },

    #[error("{kind} at position {position} has a non-string `{key}`")]
    NotAString {
        kind: NodeKind,
        key: &'static str,
        position: usize,
    },

    #[error("group at position {position} has non-list `rules`")]
    RulesNotAList { position: usize },

    #[error("node at position {position} has no group to attach to")]
    Orphan { position: usize },

    #[error("root must be a group")]
    RootIsRule,

    #[error("invalid combinator: {0}")]
    InvalidCombinator(String),

    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
}
