//! Field, field access policy, and enumerated value validation.

use ipxact_core::{
    AccessType, EnumeratedUsage, EnumeratedValue, Field, FieldAccessPolicy, ModifiedWrite, ReadAction,
    WriteValueConstraint,
};

use crate::common::{
    find_duplicates, find_errors_in_is_present, find_errors_in_memory_array, find_errors_in_parameters,
    has_valid_name, is_non_negative, is_positive, ModeRefCheck,
};
use crate::{ValidationEnv, Validator};

/// A bit expression: a non-negative integer.
fn is_bit_expression(env: &ValidationEnv<'_>, expression: &str) -> bool {
    is_non_negative(env, expression)
}

/// Reserved flag: empty, 0, or 1.
fn has_valid_reserved(env: &ValidationEnv<'_>, reserved: &str) -> bool {
    reserved.trim().is_empty() || matches!(env.int(reserved), Some(0 | 1))
}

fn find_errors_in_write_constraint(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    constraint: Option<&WriteValueConstraint>,
    subject: &str,
) {
    let Some(WriteValueConstraint::MinMax { minimum, maximum }) = constraint else {
        return;
    };
    let minimum_valid = is_bit_expression(env, minimum);
    let maximum_valid = is_bit_expression(env, maximum);
    if !minimum_valid {
        errors.push(format!(
            "Invalid minimum value set for write value constraint in {subject}"
        ));
    }
    if !maximum_valid {
        errors.push(format!(
            "Invalid maximum value set for write value constraint in {subject}"
        ));
    }
    if minimum_valid && maximum_valid && env.int_or_zero(minimum) > env.int_or_zero(maximum) {
        errors.push(format!(
            "Maximum value must be greater than or equal to the minimum value in write value constraint set for {subject}"
        ));
    }
}

fn find_errors_in_access_side_effects(
    errors: &mut Vec<String>,
    access: Option<AccessType>,
    modified_write: Option<ModifiedWrite>,
    read_action: Option<ReadAction>,
    subject: &str,
) {
    match access {
        Some(AccessType::ReadOnly) if modified_write.is_some() => errors.push(format!(
            "In {subject}, access type read-only does not allow a modified write value."
        )),
        Some(AccessType::WriteOnly | AccessType::WriteOnce) if read_action.is_some() => errors.push(format!(
            "In {subject}, access type write-only and writeOnce do not allow a read action value."
        )),
        _ => {}
    }
}

/// Checks one enumerated value of a field.
#[derive(Debug, Clone, Copy)]
pub struct EnumeratedValueValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> EnumeratedValueValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        EnumeratedValueValidator { env }
    }
}

impl Validator<EnumeratedValue> for EnumeratedValueValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, value: &EnumeratedValue, context: &str) {
        let name = &value.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for enumerated value {name} within {context}"));
        }
        if value.value.trim().is_empty() || !self.env.evaluator().is_valid_expression(&value.value) {
            errors.push(format!("Invalid value set for enumerated value {name} within {context}"));
        }
    }
}

/// Checks one Std22 field access policy.
#[derive(Debug, Clone, Copy)]
pub struct FieldAccessPolicyValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> FieldAccessPolicyValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        FieldAccessPolicyValidator { env }
    }

    /// Whether a definition reference and inline access values are both set.
    pub fn has_conflicting_definition(policy: &FieldAccessPolicy) -> bool {
        policy.definition_ref.is_some()
            && (policy.access.is_some()
                || policy.modified_write_value.is_some()
                || policy.write_value_constraint.is_some()
                || policy.read_action.is_some()
                || !policy.read_response.is_empty()
                || policy.testable.is_some()
                || !policy.reserved.is_empty())
    }

    /// Check `policy`, sharing mode reference bookkeeping with the other
    /// policies of the same field.
    pub fn find_errors_with(
        &self,
        errors: &mut Vec<String>,
        policy: &FieldAccessPolicy,
        context: &str,
        mode_refs: &mut ModeRefCheck,
    ) {
        let subject = format!("field access policy of {context}");
        mode_refs.find_errors_in(
            errors,
            self.env,
            &policy.mode_refs,
            &format!("field access policies of {context}"),
        );
        find_errors_in_access_side_effects(
            errors,
            policy.access,
            policy.modified_write_value,
            policy.read_action,
            &subject,
        );
        find_errors_in_write_constraint(errors, self.env, policy.write_value_constraint.as_ref(), &subject);
        if !self.env.evaluator().is_valid_expression(&policy.read_response) {
            errors.push(format!("Invalid read response set for {subject}"));
        }
        if !has_valid_reserved(self.env, &policy.reserved) {
            errors.push(format!("Invalid reserved set for {subject}"));
        }
        if Self::has_conflicting_definition(policy) {
            errors.push(format!(
                "Field access policy of {context} contains both a definition reference and access values."
            ));
        }
    }
}

impl Validator<FieldAccessPolicy> for FieldAccessPolicyValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, policy: &FieldAccessPolicy, context: &str) {
        self.find_errors_with(errors, policy, context, &mut ModeRefCheck::new());
    }
}

/// Checks one field of a register.
///
/// The context names the containing register, e.g. `register ctrl`.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> FieldValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        FieldValidator { env }
    }

    pub fn has_valid_name(&self, field: &Field) -> bool {
        has_valid_name(&field.name_group.name)
    }

    pub fn has_valid_bit_offset(&self, field: &Field) -> bool {
        is_non_negative(self.env, &field.bit_offset)
    }

    /// Std22 fields referencing a definition take their width from it.
    pub fn has_valid_bit_width(&self, field: &Field) -> bool {
        if self.env.is_std22() && field.field_definition_ref.is_some() {
            return field.bit_width.trim().is_empty() || is_positive(self.env, &field.bit_width);
        }
        is_positive(self.env, &field.bit_width)
    }

    /// Whether a Std22 definition reference and inline definition values
    /// are both set.
    pub fn has_conflicting_definition(field: &Field) -> bool {
        field.field_definition_ref.is_some()
            && (!field.type_identifier.is_empty()
                || !field.bit_width.is_empty()
                || field.volatile.is_some()
                || !field.field_access_policies.is_empty()
                || !field.enumerated_values.is_empty())
    }

    fn uses_enumerated_write_values(field: &Field) -> bool {
        let uses = |constraint: &Option<WriteValueConstraint>| {
            matches!(constraint, Some(WriteValueConstraint::UseEnumeratedValues))
        };
        uses(&field.write_value_constraint)
            || field
                .field_access_policies
                .iter()
                .any(|policy| uses(&policy.write_value_constraint))
    }

    fn find_errors_in_resets(&self, errors: &mut Vec<String>, field: &Field, subject: &str) {
        for reset in &field.resets {
            if reset.value.trim().is_empty() || !is_bit_expression(self.env, &reset.value) {
                errors.push(format!("Invalid reset value set for {subject}"));
            }
            if !reset.mask.trim().is_empty() && !is_bit_expression(self.env, &reset.mask) {
                errors.push(format!("Invalid reset mask set for {subject}"));
            }
        }
    }

    fn find_errors_in_enumerated_values(&self, errors: &mut Vec<String>, field: &Field) {
        if field.enumerated_values.is_empty() {
            return;
        }
        let name = &field.name_group.name;
        let context = format!("field {name}");
        let validator = EnumeratedValueValidator::new(self.env);
        for value in &field.enumerated_values {
            validator.find_errors_in(errors, value, &context);
        }
        find_duplicates(
            field.enumerated_values.iter().map(|value| value.name_group.name.as_str()),
            |duplicate| errors.push(format!("Name {duplicate} of enumerated values in {context} is not unique.")),
        );

        let has_write_value = field.enumerated_values.iter().any(|value| {
            matches!(value.usage, None | Some(EnumeratedUsage::Write | EnumeratedUsage::ReadWrite))
        });
        if Self::uses_enumerated_write_values(field) && !has_write_value {
            errors.push(format!(
                "Write value constraint of Use enumerated values needs an enumerated value with usage of write or read-write. Such an enumerated value was not found in field {name}"
            ));
        }
    }

    fn find_errors_in_access_policies(&self, errors: &mut Vec<String>, field: &Field, subject: &str) {
        let validator = FieldAccessPolicyValidator::new(self.env);
        let mut mode_refs = ModeRefCheck::new();
        for policy in &field.field_access_policies {
            validator.find_errors_with(errors, policy, subject, &mut mode_refs);
        }
        if field.field_access_policies.len() > 1 && field.field_access_policies.iter().any(|p| p.mode_refs.is_empty()) {
            errors.push(format!(
                "In {subject}, multiple field access policies are not allowed if one of them lacks a mode reference."
            ));
        }
    }
}

impl Validator<Field> for FieldValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, field: &Field, context: &str) {
        let name = &field.name_group.name;
        let subject = format!("field {name} within {context}");

        if !self.has_valid_name(field) {
            errors.push(format!("Invalid name specified for {name} within {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &field.is_present, &subject);
        } else {
            find_errors_in_memory_array(errors, self.env, field.memory_array.as_ref(), &subject);
        }
        if !self.has_valid_bit_offset(field) {
            errors.push(format!("Invalid bit offset set for {subject}"));
        }
        if !self.has_valid_bit_width(field) {
            errors.push(format!("Invalid bit width set for {subject}"));
        }
        self.find_errors_in_resets(errors, field, &subject);

        find_errors_in_access_side_effects(
            errors,
            field.access,
            field.modified_write_value,
            field.read_action,
            &subject,
        );
        find_errors_in_write_constraint(errors, self.env, field.write_value_constraint.as_ref(), &subject);
        if !has_valid_reserved(self.env, &field.reserved) {
            errors.push(format!("Invalid reserved set for {subject}"));
        }

        self.find_errors_in_enumerated_values(errors, field);
        find_errors_in_parameters(errors, self.env, &field.parameters, &format!("field {name}"));

        if self.env.is_std22() {
            self.find_errors_in_access_policies(errors, field, &subject);
            if Self::has_conflicting_definition(field) {
                errors.push(format!(
                    "Field {name} in {context} contains both a field definition reference and field definition values."
                ));
            }
        }
    }
}
