//! Application layer: the model handle and script-driven editing
//!
//! This layer orchestrates domain logic; it does not touch the terminal.

pub mod error;
pub mod error_ext;
pub mod script;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::{IoResultExt, JsonResultExt};
pub use script::{parse_script, Command};
pub use services::{QueryBuilder, ScriptRunner, TreeObserver};
