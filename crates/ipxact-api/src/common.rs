//! Helpers shared by the name-indexed facades.

use ipxact_core::{ExpressionVisitor, HasExpressions, HasName, ReferenceCounter};
use ipxact_expr::{referenced_ids, ExpressionEvaluator};

use crate::error::{ApiError, Result};

/// An expression together with its evaluated, formatted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionValue {
    /// The expression as stored in the model.
    pub expression: String,
    /// Canonical text of the evaluated value; empty for an empty
    /// expression and `x` when it does not evaluate.
    pub value: String,
}

impl ExpressionValue {
    pub(crate) fn evaluate(evaluator: &ExpressionEvaluator<'_>, expression: &str) -> Self {
        ExpressionValue {
            expression: expression.to_string(),
            value: evaluator.format_value(expression),
        }
    }
}

pub(crate) fn names<T: HasName>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.name().to_string()).collect()
}

pub(crate) fn index_of<T: HasName>(items: &[T], name: &str) -> Option<usize> {
    items.iter().position(|item| item.name() == name)
}

pub(crate) fn position<T: HasName>(items: &[T], name: &str) -> Result<usize> {
    index_of(items, name).ok_or_else(|| ApiError::ItemNotFound(name.to_string()))
}

pub(crate) fn item<'i, T: HasName>(items: &'i [T], name: &str) -> Result<&'i T> {
    Ok(&items[position(items, name)?])
}

pub(crate) fn item_mut<'i, T: HasName>(items: &'i mut [T], name: &str) -> Result<&'i mut T> {
    let index = position(items, name)?;
    Ok(&mut items[index])
}

/// `base` when it is free, otherwise the first free `base_1`, `base_2`, ...
pub(crate) fn unique_name(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Rename `old` to `new`, where `is_taken` checks the sibling namespace.
pub(crate) fn rename<T: HasName>(
    items: &mut [T],
    old: &str,
    new: &str,
    is_taken: impl Fn(&str) -> bool,
) -> Result<()> {
    let index = position(items, old)?;
    if old == new {
        return Ok(());
    }
    if is_taken(new) {
        return Err(ApiError::DuplicateName(new.to_string()));
    }
    items[index].set_name(new);
    Ok(())
}

/// Every expression of an item and its children.
#[derive(Debug, Default)]
struct ExpressionCollector {
    expressions: Vec<String>,
}

impl ExpressionVisitor for ExpressionCollector {
    fn expression(&mut self, _attribute: &'static str, expression: &str) {
        if !expression.is_empty() {
            self.expressions.push(expression.to_string());
        }
    }
}

/// Distinct valueIds mentioned anywhere in `item`, in first-use order.
pub(crate) fn ids_referenced_by(item: &dyn HasExpressions) -> Vec<String> {
    let mut collector = ExpressionCollector::default();
    item.visit_expressions(&mut collector);

    let mut ids: Vec<String> = Vec::new();
    for id in collector.expressions.iter().flat_map(|expression| referenced_ids(expression)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Mentions of `id` across a list of items and their children.
pub(crate) fn count_in_all<T: HasExpressions>(items: &[T], id: &str) -> usize {
    items.iter().map(|item| ReferenceCounter::count(item, id)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_core::{Field, Register};

    #[test]
    fn unique_names_count_up() {
        let taken = ["reg", "reg_1"];
        assert_eq!(unique_name("reg", |name| taken.contains(&name)), "reg_2");
        assert_eq!(unique_name("field", |name| taken.contains(&name)), "field");
    }

    #[test]
    fn rename_checks_siblings() {
        let mut fields = vec![Field::new("a", "0", "1"), Field::new("b", "1", "1")];
        let taken = |name: &str| name == "a" || name == "b";
        assert!(matches!(rename(&mut fields, "a", "b", taken), Err(ApiError::DuplicateName(name)) if name == "b"));
        assert!(matches!(rename(&mut fields, "c", "d", taken), Err(ApiError::ItemNotFound(name)) if name == "c"));
        rename(&mut fields, "a", "a", taken).unwrap();
        rename(&mut fields, "a", "c", taken).unwrap();
        assert_eq!(names(&fields), ["c", "b"]);
    }

    #[test]
    fn referenced_ids_are_distinct_and_ordered() {
        let mut register = Register::new("r", "base_id + 4", "width_id");
        register.fields.push(Field::new("f", "0", "width_id - base_id"));
        assert_eq!(ids_referenced_by(&register), ["base_id", "width_id"]);
        assert_eq!(count_in_all(std::slice::from_ref(&register), "width_id"), 2);
    }
}
