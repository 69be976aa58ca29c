//! Filter-query tree model.
//!
//! A query is a tree of logical groups (`AND`/`OR`) and comparison rules.
//! [`application::QueryBuilder`] owns the live tree, accepts add, modify and
//! remove requests by node id, and hands a deep copy of the tree to an
//! observer after each of them.
//!
//! ```
//! use querytree::application::QueryBuilder;
//! use querytree::domain::{NodeKind, Tree};
//!
//! let mut last = None;
//! let mut model = QueryBuilder::new(None, |tree: Tree| last = Some(tree));
//! model.add_child("g-0", NodeKind::Rule);
//! model.modify_field("r-0", "field", "name");
//! drop(model);
//! assert_eq!(last.unwrap().rules.len(), 1);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
