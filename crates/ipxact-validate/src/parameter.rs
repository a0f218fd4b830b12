//! Parameter and choice validation.

use ipxact_core::{Choice, Parameter, ParameterType, Resolve};
use ipxact_expr::Value;

use crate::common::{find_duplicates, has_valid_name, is_non_negative};
use crate::{ValidationEnv, Validator};

/// Checks one parameter against its type, bounds, and choice.
#[derive(Debug, Clone, Copy)]
pub struct ParameterValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> ParameterValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        ParameterValidator { env }
    }

    pub fn has_valid_name(&self, parameter: &Parameter) -> bool {
        has_valid_name(&parameter.name_group.name)
    }

    pub fn has_valid_type(&self, parameter: &Parameter) -> bool {
        parameter.parameter_type.is_empty() || parameter.parameter_type().is_some()
    }

    /// Value is set, evaluates, fits the type, honors the bounds, and is
    /// one of the choice's enumerations.
    pub fn has_valid_value(&self, parameter: &Parameter) -> bool {
        !parameter.value.trim().is_empty()
            && self.env.evaluator().is_valid_expression(&parameter.value)
            && self.value_fits_type(&parameter.value, parameter.parameter_type())
            && !self.is_below_minimum(parameter)
            && !self.is_above_maximum(parameter)
            && self.has_valid_value_for_choice(parameter)
    }

    pub fn has_valid_resolve(&self, parameter: &Parameter) -> bool {
        parameter.resolve_kind().is_some()
    }

    /// User and generated parameters need a valueId.
    pub fn has_valid_value_id(&self, parameter: &Parameter) -> bool {
        !matches!(parameter.resolve_kind(), Some(Resolve::User | Resolve::Generated))
            || !parameter.value_id.is_empty()
    }

    pub fn has_valid_choice(&self, parameter: &Parameter) -> bool {
        parameter.choice_ref.is_empty() || self.choice(&parameter.choice_ref).is_some()
    }

    /// Vector bounds are both set to non-negative integers, on bit
    /// parameters only.
    pub fn has_valid_vector(&self, parameter: &Parameter) -> bool {
        !parameter.has_vector()
            || (matches!(parameter.parameter_type(), None | Some(ParameterType::Bit))
                && is_non_negative(self.env, &parameter.vector_left)
                && is_non_negative(self.env, &parameter.vector_right))
    }

    /// Array bounds are both set to non-negative integers.
    pub fn has_valid_array(&self, parameter: &Parameter) -> bool {
        !parameter.has_array()
            || (is_non_negative(self.env, &parameter.array_left)
                && is_non_negative(self.env, &parameter.array_right))
    }

    fn choice(&self, name: &str) -> Option<&Choice> {
        self.env.choices().iter().find(|choice| choice.name == name)
    }

    fn value_fits_type(&self, expression: &str, kind: Option<ParameterType>) -> bool {
        let Some(kind) = kind else {
            return true;
        };
        match self.env.evaluator().evaluate(expression) {
            Ok(value) => value_fits(&value, kind),
            Err(_) => false,
        }
    }

    fn bound_is_valid(&self, bound: &str, kind: Option<ParameterType>) -> bool {
        bound.trim().is_empty()
            || (self.env.evaluator().is_valid_expression(bound) && self.value_fits_type(bound, kind))
    }

    fn numeric(&self, expression: &str) -> Option<f64> {
        if expression.trim().is_empty() {
            return None;
        }
        self.env.evaluator().evaluate(expression).ok()?.as_f64()
    }

    fn is_below_minimum(&self, parameter: &Parameter) -> bool {
        match (self.numeric(&parameter.value), self.numeric(&parameter.minimum)) {
            (Some(value), Some(minimum)) => value < minimum,
            _ => false,
        }
    }

    fn is_above_maximum(&self, parameter: &Parameter) -> bool {
        match (self.numeric(&parameter.value), self.numeric(&parameter.maximum)) {
            (Some(value), Some(maximum)) => value > maximum,
            _ => false,
        }
    }

    fn has_valid_value_for_choice(&self, parameter: &Parameter) -> bool {
        if parameter.choice_ref.is_empty() {
            return true;
        }
        let Some(choice) = self.choice(&parameter.choice_ref) else {
            return false;
        };
        let evaluator = self.env.evaluator();
        let matches = |value: &Value| {
            choice.enumerations.iter().any(|enumeration| {
                evaluator
                    .evaluate(&enumeration.value)
                    .is_ok_and(|candidate| candidate == *value)
            })
        };
        match evaluator.evaluate(&parameter.value) {
            Ok(Value::Array(items)) => items.iter().all(matches),
            Ok(value) => matches(&value),
            Err(_) => choice.has_enumeration(&parameter.value),
        }
    }
}

/// Whether an evaluated value is legal for a parameter type. Arrays are
/// checked element by element.
fn value_fits(value: &Value, kind: ParameterType) -> bool {
    if let Value::Array(items) = value {
        return items.iter().all(|item| value_fits(item, kind));
    }
    match kind {
        ParameterType::String => matches!(value, Value::Str(_)),
        ParameterType::Shortreal | ParameterType::Real => value.as_f64().is_some(),
        ParameterType::Bit => value.as_int().is_some_and(|v| v >= 0),
        ParameterType::Byte => value.as_int().is_some_and(|v| i8::try_from(v).is_ok()),
        ParameterType::Shortint => value.as_int().is_some_and(|v| i16::try_from(v).is_ok()),
        ParameterType::Int => value.as_int().is_some_and(|v| i32::try_from(v).is_ok()),
        ParameterType::Longint => value
            .as_int()
            .is_some_and(|v| i64::try_from(v).is_ok() || u64::try_from(v).is_ok()),
    }
}

impl Validator<Parameter> for ParameterValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, parameter: &Parameter, context: &str) {
        let name = &parameter.name_group.name;
        let label = format!("parameter {name}");

        if !self.has_valid_name(parameter) {
            errors.push(format!("No valid name specified for {label} within {context}"));
        }

        if parameter.value.trim().is_empty() {
            errors.push(format!("No value specified for {label} within {context}"));
        } else if !self.env.evaluator().is_valid_expression(&parameter.value) {
            errors.push(format!(
                "Invalid value '{}' specified for {label} within {context}",
                parameter.value
            ));
        } else {
            if !self.value_fits_type(&parameter.value, parameter.parameter_type()) {
                errors.push(format!(
                    "Value '{}' is not valid for type {} in {label} within {context}",
                    parameter.value, parameter.parameter_type
                ));
            }
            if self.is_below_minimum(parameter) {
                errors.push(format!(
                    "Value '{}' violates minimum value {} in {label} within {context}",
                    parameter.value, parameter.minimum
                ));
            }
            if self.is_above_maximum(parameter) {
                errors.push(format!(
                    "Value '{}' violates maximum value {} in {label} within {context}",
                    parameter.value, parameter.maximum
                ));
            }
            if self.has_valid_choice(parameter) && !self.has_valid_value_for_choice(parameter) {
                errors.push(format!(
                    "Value '{}' references unknown enumeration for choice {} in {label} within {context}",
                    parameter.value, parameter.choice_ref
                ));
            }
        }

        if !self.has_valid_type(parameter) {
            errors.push(format!(
                "Invalid type {} specified for {label} within {context}",
                parameter.parameter_type
            ));
        }
        let kind = parameter.parameter_type();
        if !self.bound_is_valid(&parameter.minimum, kind) {
            errors.push(format!(
                "Minimum value {} is not valid for {label} within {context}",
                parameter.minimum
            ));
        }
        if !self.bound_is_valid(&parameter.maximum, kind) {
            errors.push(format!(
                "Maximum value {} is not valid for {label} within {context}",
                parameter.maximum
            ));
        }
        if !self.has_valid_choice(parameter) {
            errors.push(format!(
                "Choice {} referenced in {label} is not specified within {context}",
                parameter.choice_ref
            ));
        }
        if !self.has_valid_resolve(parameter) {
            errors.push(format!(
                "Invalid resolve {} specified for {label} within {context}",
                parameter.resolve
            ));
        }
        if !self.has_valid_value_id(parameter) {
            errors.push(format!(
                "No identifier specified for {label} with resolve {} within {context}",
                parameter.resolve
            ));
        }
        if !self.has_valid_vector(parameter) {
            errors.push(format!("Invalid bit vector values specified for {label} within {context}"));
        }
        if !self.has_valid_array(parameter) {
            errors.push(format!("Invalid array values specified for {label} within {context}"));
        }
    }
}

/// Checks one choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceValidator;

impl ChoiceValidator {
    pub fn new() -> Self {
        ChoiceValidator
    }
}

impl Validator<Choice> for ChoiceValidator {
    fn find_errors_in(&self, errors: &mut Vec<String>, choice: &Choice, context: &str) {
        if !has_valid_name(&choice.name) {
            errors.push(format!("Invalid name specified for choice {} within {context}", choice.name));
        }
        if choice.enumerations.is_empty() {
            errors.push(format!(
                "Choice {} within {context} must contain at least one enumeration.",
                choice.name
            ));
        }
        if choice.enumerations.iter().any(|e| e.value.trim().is_empty()) {
            errors.push(format!(
                "Enumeration without a value in choice {} within {context}",
                choice.name
            ));
        }
        find_duplicates(choice.enumerations.iter().map(|e| e.value.as_str()), |value| {
            errors.push(format!(
                "Enumeration value {value} in choice {} within {context} is not unique.",
                choice.name
            ));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_core::{Enumeration, Revision};
    use ipxact_expr::{ExpressionEvaluator, NullFinder};
    use rstest::rstest;

    fn env() -> ValidationEnv<'static> {
        let mut choice = Choice::new("widths");
        choice.enumerations.push(Enumeration::new("8", "narrow"));
        choice.enumerations.push(Enumeration::new("'h20", "wide"));
        ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), Revision::Std22).with_choices(&[choice])
    }

    fn errors_for(parameter: &Parameter) -> Vec<String> {
        let env = env();
        let mut errors = Vec::new();
        ParameterValidator::new(&env).find_errors_in(&mut errors, parameter, "test");
        errors
    }

    #[rstest]
    #[case("int", "2**31 - 1", true)]
    #[case("int", "2**31", false)]
    #[case("byte", "-128", true)]
    #[case("byte", "128", false)]
    #[case("shortint", "'h7FFF", true)]
    #[case("longint", "2**64 - 1", true)]
    #[case("real", "1.5", true)]
    #[case("string", "\"text\"", true)]
    #[case("string", "12", false)]
    #[case("bit", "{1,0,1}", true)]
    #[case("", "\"anything\"", true)]
    fn value_must_fit_type(#[case] kind: &str, #[case] value: &str, #[case] valid: bool) {
        let mut parameter = Parameter::new("p", value);
        parameter.parameter_type = kind.into();
        let env = env();
        assert_eq!(ParameterValidator::new(&env).has_valid_value(&parameter), valid);
        assert_eq!(errors_for(&parameter).is_empty(), valid);
    }

    #[test]
    fn empty_value_is_reported() {
        let parameter = Parameter::new("p", "");
        assert_eq!(errors_for(&parameter), ["No value specified for parameter p within test"]);
    }

    #[test]
    fn bounds_are_enforced() {
        let mut parameter = Parameter::new("p", "12");
        parameter.parameter_type = "int".into();
        parameter.minimum = "16".into();
        parameter.maximum = "8".into();
        assert_eq!(
            errors_for(&parameter),
            [
                "Value '12' violates minimum value 16 in parameter p within test",
                "Value '12' violates maximum value 8 in parameter p within test",
            ]
        );
    }

    #[test]
    fn choice_values_compare_by_evaluated_value() {
        let mut parameter = Parameter::new("p", "32");
        parameter.choice_ref = "widths".into();
        assert!(errors_for(&parameter).is_empty());

        parameter.value = "16".into();
        assert_eq!(
            errors_for(&parameter),
            ["Value '16' references unknown enumeration for choice widths in parameter p within test"]
        );

        parameter.choice_ref = "missing".into();
        assert_eq!(
            errors_for(&parameter),
            ["Choice missing referenced in parameter p is not specified within test"]
        );
    }

    #[test]
    fn user_parameters_need_a_value_id() {
        let mut parameter = Parameter::new("p", "1");
        parameter.resolve = "user".into();
        parameter.value_id.clear();
        assert_eq!(
            errors_for(&parameter),
            ["No identifier specified for parameter p with resolve user within test"]
        );

        parameter.resolve = "sometimes".into();
        assert_eq!(
            errors_for(&parameter),
            ["Invalid resolve sometimes specified for parameter p within test"]
        );
    }

    #[test]
    fn vectors_belong_to_bit_parameters() {
        let mut parameter = Parameter::new("p", "1");
        parameter.vector_left = "7".into();
        parameter.vector_right = "0".into();
        assert!(errors_for(&parameter).is_empty());

        parameter.parameter_type = "int".into();
        assert_eq!(
            errors_for(&parameter),
            ["Invalid bit vector values specified for parameter p within test"]
        );
    }

    #[test]
    fn choice_needs_enumerations() {
        let mut errors = Vec::new();
        ChoiceValidator::new().find_errors_in(&mut errors, &Choice::new("empty"), "test");
        assert_eq!(errors, ["Choice empty within test must contain at least one enumeration."]);

        let mut choice = Choice::new("dup");
        choice.enumerations.push(Enumeration::new("1", "one"));
        choice.enumerations.push(Enumeration::new("1", "uno"));
        assert!(!ChoiceValidator::new().validate(&choice));
    }
}
