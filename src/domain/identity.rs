//! Identity allocation for tree nodes.

use tracing::{debug, instrument, warn};

use crate::domain::node::NodeKind;

/// Issues `"<mark>-<n>"` ids with an independent counter per node kind.
///
/// Counters only ever grow: an id handed out is never issued again by the
/// same allocator, whether or not the caller ended up using it.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    group_mark: String,
    rule_mark: String,
    group_count: u64,
    rule_count: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_marks("g", "r", 0)
    }

    /// Allocator whose counters both begin at `start`.
    ///
    /// A counter that reaches `u64::MAX` stops there and keeps issuing the
    /// same id, so `start` should leave room for the allocations expected.
    pub fn with_marks(
        group_mark: impl Into<String>,
        rule_mark: impl Into<String>,
        start: u64,
    ) -> Self {
        Self {
            group_mark: group_mark.into(),
            rule_mark: rule_mark.into(),
            group_count: start,
            rule_count: start,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn allocate(&mut self, kind: NodeKind) -> String {
        let (mark, counter) = match kind {
            NodeKind::Group => (&self.group_mark, &mut self.group_count),
            NodeKind::Rule => (&self.rule_mark, &mut self.rule_count),
        };
        let id = format!("{}-{}", mark, counter);
        match counter.checked_add(1) {
            Some(next) => *counter = next,
            None => warn!(%id, "id counter exhausted, ids will repeat"),
        }
        debug!(%id, "allocated");
        id
    }

    /// Next counter value for `kind`.
    pub fn peek(&self, kind: NodeKind) -> u64 {
        match kind {
            NodeKind::Group => self.group_count,
            NodeKind::Rule => self.rule_count,
        }
    }
}
