//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod query;
mod script;

pub use query::{QueryBuilder, TreeObserver};
pub use script::{ScriptReport, ScriptRunner};
