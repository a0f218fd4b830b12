//! Symbol lookup used while evaluating expressions.

use std::collections::{BTreeMap, HashMap};

/// Maps a valueId or macro name to the expression it stands for.
///
/// Implementations must stay read-only while an evaluation is running; the
/// evaluator may call them from several threads at once.
pub trait ParameterFinder: Send + Sync {
    /// The expression stored under `id`, if the id is known.
    fn value_for_id(&self, id: &str) -> Option<String>;

    /// Whether `id` is known.
    fn has_id(&self, id: &str) -> bool {
        self.value_for_id(id).is_some()
    }

    /// Human-readable name for `id`, used when displaying references.
    fn name_for_id(&self, _id: &str) -> Option<String> {
        None
    }
}

/// A finder that knows no symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFinder;

impl ParameterFinder for NullFinder {
    fn value_for_id(&self, _id: &str) -> Option<String> {
        None
    }
}

impl ParameterFinder for HashMap<String, String> {
    fn value_for_id(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

impl ParameterFinder for BTreeMap<String, String> {
    fn value_for_id(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}
