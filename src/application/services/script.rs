//! Applies edit scripts to a query model and records every snapshot.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing::{instrument, warn};

use crate::application::script::Command;
use crate::application::services::query::QueryBuilder;
use crate::config::OptionsConfig;
use crate::domain::{Attribute, Combinator, IdAllocator, Tree};

/// Outcome of a script run.
#[derive(Debug, Clone, Default)]
pub struct ScriptReport {
    /// Construction snapshot followed by one snapshot per command
    pub snapshots: Vec<Tree>,
    /// Values outside the configured choice lists
    pub warnings: Vec<String>,
}

impl ScriptReport {
    pub fn final_tree(&self) -> Option<&Tree> {
        self.snapshots.last()
    }
}

/// Drives a [`QueryBuilder`] from parsed commands.
pub struct ScriptRunner {
    builder: QueryBuilder<'static>,
    snapshots: Rc<RefCell<Vec<Tree>>>,
    options: OptionsConfig,
}

impl ScriptRunner {
    pub fn new(initial: Option<Value>, ids: IdAllocator, options: OptionsConfig) -> Self {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&snapshots);
        let builder = QueryBuilder::with_allocator(initial, ids, move |tree: Tree| {
            sink.borrow_mut().push(tree);
        });
        Self {
            builder,
            snapshots,
            options,
        }
    }

    #[instrument(level = "debug", skip_all, fields(commands = commands.len()))]
    pub fn run(self, commands: &[Command]) -> ScriptReport {
        let Self {
            mut builder,
            snapshots,
            options,
        } = self;
        let mut warnings = Vec::new();

        for command in commands {
            match command {
                Command::Add { parent_id, kind } => builder.add_child(parent_id, *kind),
                Command::Modify {
                    node_id,
                    field,
                    value,
                } => {
                    if let Some(warning) = check_choice(&options, node_id, field, value) {
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                    builder.modify_field(node_id, field, value);
                }
                Command::Remove { node_id } => builder.remove_child(node_id),
            }
        }

        drop(builder);
        let snapshots = snapshots.take();
        ScriptReport {
            snapshots,
            warnings,
        }
    }
}

/// Describes a `modify` value the presentation layer would not offer.
///
/// Empty values are always allowed; they mean "not chosen yet".
fn check_choice(
    options: &OptionsConfig,
    node_id: &str,
    field: &str,
    value: &str,
) -> Option<String> {
    let Ok(attribute) = field.parse::<Attribute>() else {
        return Some(format!("{}: `{}` is not an editable attribute", node_id, field));
    };
    if value.is_empty() {
        return None;
    }
    let allowed = match attribute {
        Attribute::Field => &options.fields,
        Attribute::Operator => &options.operators,
        Attribute::Combinator => {
            return value
                .parse::<Combinator>()
                .err()
                .map(|e| format!("{}: {}", node_id, e));
        }
        Attribute::Value => return None,
    };
    if allowed.iter().any(|choice| choice == value) {
        None
    } else {
        Some(format!(
            "{}: {} `{}` is not one of [{}]",
            node_id,
            attribute,
            value,
            allowed.join(", ")
        ))
    }
}
