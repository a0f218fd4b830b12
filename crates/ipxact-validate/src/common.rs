//! Rules shared by several validators.

use std::collections::HashSet;

use ipxact_core::{AccessPolicy, AccessType, DocumentData, MemoryArray, ModeReference, Parameter, Vlnv};

use crate::parameter::{ChoiceValidator, ParameterValidator};
use crate::{ValidationEnv, Validator};

/// A name is valid when it has a non-whitespace character.
pub fn has_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Report every name that occurs more than once, once per name, in order
/// of its second occurrence.
pub fn find_duplicates<'n, I>(names: I, mut report: impl FnMut(&str))
where
    I: IntoIterator<Item = &'n str>,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            report(name);
        }
    }
}

/// A presence expression is valid when empty or evaluating to 0 or 1.
pub fn has_valid_is_present(env: &ValidationEnv<'_>, is_present: &str) -> bool {
    is_present.trim().is_empty() || matches!(env.int(is_present), Some(0 | 1))
}

/// Whether an item with this presence expression takes up space.
pub fn is_present(env: &ValidationEnv<'_>, is_present: &str) -> bool {
    is_present.trim().is_empty() || env.int_or_zero(is_present) != 0
}

/// Expression evaluating to an integer of at least zero.
pub fn is_non_negative(env: &ValidationEnv<'_>, expression: &str) -> bool {
    env.int(expression).is_some_and(|value| value >= 0)
}

/// Expression evaluating to an integer greater than zero.
pub fn is_positive(env: &ValidationEnv<'_>, expression: &str) -> bool {
    env.int(expression).is_some_and(|value| value > 0)
}

/// Optional expression: empty, or a non-negative integer.
pub fn is_empty_or_non_negative(env: &ValidationEnv<'_>, expression: &str) -> bool {
    expression.trim().is_empty() || is_non_negative(env, expression)
}

/// Number of array elements, one for items that are not arrays.
///
/// `None` when the product of the dimensions does not fit an `i128`.
pub fn array_element_count(env: &ValidationEnv<'_>, array: Option<&MemoryArray>) -> Option<i128> {
    array.map_or(Some(1), |array| {
        array
            .dimensions
            .iter()
            .map(|dimension| env.int_or_zero(&dimension.value))
            .try_fold(1_i128, i128::checked_mul)
    })
}

/// Last address of `span` units starting at `begin`, `None` on overflow.
pub(crate) fn last_address(begin: i128, span: i128) -> Option<i128> {
    begin.checked_add(span)?.checked_sub(1)
}

pub(crate) fn find_errors_in_is_present(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    is_present: &str,
    context: &str,
) {
    if !has_valid_is_present(env, is_present) {
        errors.push(format!(
            "Invalid isPresent set for {context}. Value should evaluate to 0 or 1."
        ));
    }
}

pub(crate) fn find_errors_in_memory_array(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    array: Option<&MemoryArray>,
    context: &str,
) {
    let Some(array) = array else {
        return;
    };
    if array.dimensions.is_empty() {
        errors.push(format!("No dimensions specified for array in {context}"));
    }
    for dimension in &array.dimensions {
        if !is_positive(env, &dimension.value) {
            errors.push(format!(
                "Invalid dimension '{}' set for array in {context}",
                dimension.value
            ));
        }
    }
    if env.is_std22() && !is_empty_or_non_negative(env, &array.stride) {
        errors.push(format!("Invalid stride '{}' set for array in {context}", array.stride));
    }
}

/// Parameters of one item, with uniqueness of their names.
pub(crate) fn find_errors_in_parameters(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    parameters: &[Parameter],
    context: &str,
) {
    let validator = ParameterValidator::new(env);
    for parameter in parameters {
        validator.find_errors_in(errors, parameter, context);
    }
    find_duplicates(parameters.iter().map(|p| p.name_group.name.as_str()), |name| {
        errors.push(format!("Name {name} of parameters in {context} is not unique."));
    });
}

pub(crate) fn find_errors_in_vlnv(errors: &mut Vec<String>, vlnv: &Vlnv, context: &str) {
    for (part, value) in ["vendor", "library", "name", "version"].into_iter().zip(vlnv.parts()) {
        if value.trim().is_empty() {
            errors.push(format!("No {part} specified for vlnv within {context}"));
        }
    }
}

/// Identity, parameters, choices, and assertions every document carries.
pub(crate) fn find_errors_in_document_data(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    data: &DocumentData,
    context: &str,
) {
    find_errors_in_vlnv(errors, &data.vlnv, context);
    find_errors_in_parameters(errors, env, &data.parameters, context);

    for choice in &data.choices {
        ChoiceValidator::new().find_errors_in(errors, choice, context);
    }
    find_duplicates(data.choices.iter().map(|c| c.name.as_str()), |name| {
        errors.push(format!("Choice name {name} within {context} is not unique."));
    });

    for assertion in &data.assertions {
        let name = &assertion.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for assertion {name} within {context}"));
        }
        match env.int(&assertion.assert) {
            Some(0) => errors.push(format!("Assertion {name} within {context} does not hold.")),
            Some(_) => {}
            None => errors.push(format!("Invalid assert set for assertion {name} within {context}")),
        }
    }
    find_duplicates(data.assertions.iter().map(|a| a.name_group.name.as_str()), |name| {
        errors.push(format!("Assertion name {name} within {context} is not unique."));
    });
}

/// Mode references already seen among the policies or alternates of one
/// owner. Each kind of duplicate is reported once per owner.
#[derive(Debug, Default)]
pub struct ModeRefCheck {
    references: HashSet<String>,
    priorities: HashSet<u32>,
    duplicate_reference_reported: bool,
    duplicate_priority_reported: bool,
}

impl ModeRefCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `mode_refs` against the references seen so far.
    pub fn find_errors_in(
        &mut self,
        errors: &mut Vec<String>,
        env: &ValidationEnv<'_>,
        mode_refs: &[ModeReference],
        context: &str,
    ) {
        for mode_ref in mode_refs {
            if !has_valid_name(&mode_ref.reference) {
                errors.push(format!("Empty mode reference in {context}."));
            } else if let Some(scope) = env.component() {
                if !scope.mode_names.contains(&mode_ref.reference) {
                    errors.push(format!(
                        "Mode reference {} in {context} does not refer to any existing mode.",
                        mode_ref.reference
                    ));
                }
            }

            match mode_ref.priority.trim().parse::<u32>() {
                Ok(priority) => {
                    if !self.priorities.insert(priority) && !self.duplicate_priority_reported {
                        errors.push(format!(
                            "One or more mode references in {context} contain duplicate priority values."
                        ));
                        self.duplicate_priority_reported = true;
                    }
                }
                Err(_) => errors.push(format!(
                    "Invalid priority '{}' set for mode reference {} in {context}.",
                    mode_ref.priority, mode_ref.reference
                )),
            }

            if !self.references.insert(mode_ref.reference.clone()) && !self.duplicate_reference_reported {
                errors.push(format!(
                    "One or more mode references in {context} contain duplicate mode reference values."
                ));
                self.duplicate_reference_reported = true;
            }
        }
    }
}

/// Std22 access policies of a register, register file, or address block.
/// `owner` reads like `register 'ctrl' within address block 'b'`.
pub(crate) fn find_errors_in_access_policies(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    policies: &[AccessPolicy],
    owner: &str,
) {
    let context = format!("access policies of {owner}");
    let mut check = ModeRefCheck::new();
    for policy in policies {
        check.find_errors_in(errors, env, &policy.mode_refs, &context);
    }
    if policies.len() > 1 && policies.iter().any(|policy| policy.mode_refs.is_empty()) {
        errors.push(format!(
            "In {owner}, multiple access policies are not allowed if one of them lacks a mode reference."
        ));
    }
}

/// Whether a child with `inner` access fits a container with `outer` access.
pub fn access_is_compatible(outer: Option<AccessType>, inner: Option<AccessType>) -> bool {
    let (Some(outer), Some(inner)) = (outer, inner) else {
        return true;
    };
    match outer {
        AccessType::ReadWrite => true,
        AccessType::ReadOnly => inner == AccessType::ReadOnly,
        AccessType::WriteOnly => matches!(inner, AccessType::WriteOnly | AccessType::WriteOnce),
        AccessType::ReadWriteOnce => matches!(
            inner,
            AccessType::ReadOnly | AccessType::ReadWriteOnce | AccessType::WriteOnce
        ),
        AccessType::WriteOnce => inner == AccessType::WriteOnce,
        AccessType::NoAccess => inner == AccessType::NoAccess,
    }
}

/// Text of an optional access value for messages.
pub(crate) fn access_text(access: Option<AccessType>) -> &'static str {
    access.map_or("", AccessType::as_str)
}

/// An address or bit range claimed by a named item.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReservedArea {
    name: String,
    begin: i128,
    end: i128,
}

/// Collects the ranges of sibling items and reports the pairs that overlap.
#[derive(Debug, Default)]
pub struct MemoryReserve {
    areas: Vec<ReservedArea>,
}

impl MemoryReserve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `begin..=end` for `name`. Empty ranges claim nothing.
    pub fn add_area(&mut self, name: &str, begin: i128, end: i128) {
        if end < begin {
            return;
        }
        self.areas.push(ReservedArea {
            name: name.to_string(),
            begin,
            end,
        });
    }

    /// Overlapping pairs in order of their start addresses.
    fn overlaps(&self) -> Vec<(&ReservedArea, &ReservedArea)> {
        let mut sorted: Vec<&ReservedArea> = self.areas.iter().collect();
        sorted.sort_by_key(|area| (area.begin, area.end));

        let mut pairs = Vec::new();
        for (index, area) in sorted.iter().enumerate() {
            for later in &sorted[index + 1..] {
                if later.begin > area.end {
                    break;
                }
                pairs.push((*area, *later));
            }
        }
        pairs
    }

    pub fn has_overlap(&self) -> bool {
        !self.overlaps().is_empty()
    }

    /// One message per overlapping pair: `<kind> a and b overlap within <context>`.
    pub fn find_errors_in_overlap(&self, errors: &mut Vec<String>, kind: &str, context: &str) {
        for (first, second) in self.overlaps() {
            errors.push(format!(
                "{kind} {} and {} overlap within {context}",
                first.name, second.name
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_core::{Mode, Revision};
    use ipxact_expr::{ExpressionEvaluator, NullFinder};
    use rstest::rstest;

    fn env() -> ValidationEnv<'static> {
        ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), Revision::Std22)
    }

    #[rstest]
    #[case("reg", true)]
    #[case("", false)]
    #[case("   ", false)]
    #[case("\t\n", false)]
    fn name_validity(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(has_valid_name(name), valid);
    }

    #[test]
    fn duplicates_are_reported_once_per_name() {
        let mut found = Vec::new();
        find_duplicates(["a", "b", "a", "a", "b", "c"], |name| found.push(name.to_string()));
        assert_eq!(found, ["a", "b"]);
    }

    #[rstest]
    #[case("", true)]
    #[case("0", true)]
    #[case("1", true)]
    #[case("2", false)]
    #[case("1 +", false)]
    fn presence_must_be_zero_or_one(#[case] expression: &str, #[case] valid: bool) {
        assert_eq!(has_valid_is_present(&env(), expression), valid);
    }

    #[test]
    fn reserve_reports_each_overlapping_pair() {
        let mut reserve = MemoryReserve::new();
        reserve.add_area("low", 0, 7);
        reserve.add_area("high", 16, 31);
        reserve.add_area("middle", 4, 11);
        reserve.add_area("empty", 5, 4);

        let mut errors = Vec::new();
        reserve.find_errors_in_overlap(&mut errors, "Fields", "register ctrl");
        assert_eq!(errors, ["Fields low and middle overlap within register ctrl"]);
        assert!(reserve.has_overlap());
    }

    #[test]
    fn touching_areas_do_not_overlap() {
        let mut reserve = MemoryReserve::new();
        reserve.add_area("a", 0, 3);
        reserve.add_area("b", 4, 7);
        assert!(!reserve.has_overlap());
    }

    #[test]
    fn duplicate_priorities_and_references_are_reported_once() {
        let refs = [
            ModeReference::new("run", "0"),
            ModeReference::new("run", "0"),
            ModeReference::new("run", "0"),
        ];
        let mut errors = Vec::new();
        ModeRefCheck::new().find_errors_in(&mut errors, &env(), &refs, "test");
        assert_eq!(
            errors,
            [
                "One or more mode references in test contain duplicate priority values.",
                "One or more mode references in test contain duplicate mode reference values.",
            ]
        );
    }

    #[test]
    fn mode_references_resolve_against_the_component() {
        let mut component = ipxact_core::Component::default();
        component.modes.push(Mode::new("run"));
        let env = env().for_component(&component);

        let refs = [ModeReference::new("run", "0"), ModeReference::new("sleep", "x")];
        let mut errors = Vec::new();
        ModeRefCheck::new().find_errors_in(&mut errors, &env, &refs, "test");
        assert_eq!(
            errors,
            [
                "Mode reference sleep in test does not refer to any existing mode.",
                "Invalid priority 'x' set for mode reference sleep in test.",
            ]
        );
    }

    #[test]
    fn policy_without_modes_must_stand_alone() {
        let policies = [
            AccessPolicy::default(),
            AccessPolicy {
                mode_refs: vec![ModeReference::new("run", "0")],
                ..Default::default()
            },
        ];
        let mut errors = Vec::new();
        find_errors_in_access_policies(&mut errors, &env(), &policies, "register 'r' within test");
        assert_eq!(
            errors,
            ["In register 'r' within test, multiple access policies are not allowed if one of them lacks a mode reference."]
        );
    }

    #[rstest]
    #[case(Some(AccessType::ReadWrite), Some(AccessType::WriteOnly), true)]
    #[case(Some(AccessType::ReadOnly), Some(AccessType::ReadWrite), false)]
    #[case(Some(AccessType::WriteOnly), Some(AccessType::WriteOnce), true)]
    #[case(Some(AccessType::ReadWriteOnce), Some(AccessType::WriteOnly), false)]
    #[case(None, Some(AccessType::ReadOnly), true)]
    #[case(Some(AccessType::WriteOnce), None, true)]
    fn access_compatibility(
        #[case] outer: Option<AccessType>,
        #[case] inner: Option<AccessType>,
        #[case] compatible: bool,
    ) {
        assert_eq!(access_is_compatible(outer, inner), compatible);
    }

    #[test]
    fn document_data_checks_identity_and_assertions() {
        let mut data = DocumentData::new(
            Vlnv::new(ipxact_core::VlnvType::Component, "acme", "", "uart", ""),
            Revision::Std22,
        );
        for (name, assert) in [("holds", "1 == 1"), ("fails", "2 < 1"), ("holds", "x +")] {
            data.assertions.push(ipxact_core::Assertion {
                name_group: ipxact_core::NameGroup::new(name),
                assert: assert.into(),
                ..Default::default()
            });
        }

        let mut errors = Vec::new();
        find_errors_in_document_data(&mut errors, &env(), &data, "component acme::uart:");
        assert_eq!(
            errors,
            [
                "No library specified for vlnv within component acme::uart:",
                "No version specified for vlnv within component acme::uart:",
                "Assertion fails within component acme::uart: does not hold.",
                "Invalid assert set for assertion holds within component acme::uart:",
                "Assertion name holds within component acme::uart: is not unique.",
            ]
        );
    }
}
