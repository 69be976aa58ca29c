//! Domain layer: query tree model and its mutation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod identity;
pub mod mutation;
pub mod node;
pub mod normalize;
pub mod traverse;

pub use arena::{NodeData, NodePayload, TreeArena, TreeNode};
pub use error::DomainError;
pub use identity::IdAllocator;
pub use node::{Attribute, Combinator, Group, Node, NodeKind, Rule, Tree};
pub use normalize::{check_node, fresh_tree, normalize};
pub use traverse::Traverse;
