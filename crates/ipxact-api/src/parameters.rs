//! Name-indexed access to a parameter list.
//!
//! Expressions are evaluated against the list itself: a parameter whose
//! value mentions the valueId of a sibling sees that sibling's value.

use ipxact_core::{Choice, DocumentParameterFinder, HasExpressions, Parameter, ReferenceCounter, Revision};
use ipxact_expr::{EvaluatorConfig, ExpressionEvaluator};
use ipxact_validate::{ParameterValidator, ValidationEnv, Validator};
use tracing::debug;

use crate::common::{self, ExpressionValue};
use crate::error::Result;

/// Expression-valued attributes of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterExpression {
    Value,
    Minimum,
    Maximum,
    VectorLeft,
    VectorRight,
    ArrayLeft,
    ArrayRight,
}

impl ParameterExpression {
    fn get(self, parameter: &Parameter) -> &str {
        match self {
            ParameterExpression::Value => &parameter.value,
            ParameterExpression::Minimum => &parameter.minimum,
            ParameterExpression::Maximum => &parameter.maximum,
            ParameterExpression::VectorLeft => &parameter.vector_left,
            ParameterExpression::VectorRight => &parameter.vector_right,
            ParameterExpression::ArrayLeft => &parameter.array_left,
            ParameterExpression::ArrayRight => &parameter.array_right,
        }
    }

    fn get_mut(self, parameter: &mut Parameter) -> &mut String {
        match self {
            ParameterExpression::Value => &mut parameter.value,
            ParameterExpression::Minimum => &mut parameter.minimum,
            ParameterExpression::Maximum => &mut parameter.maximum,
            ParameterExpression::VectorLeft => &mut parameter.vector_left,
            ParameterExpression::VectorRight => &mut parameter.vector_right,
            ParameterExpression::ArrayLeft => &mut parameter.array_left,
            ParameterExpression::ArrayRight => &mut parameter.array_right,
        }
    }
}

/// Editor facade over a parameter list.
#[derive(Debug)]
pub struct ParametersInterface<'a> {
    parameters: &'a mut Vec<Parameter>,
    revision: Revision,
    config: EvaluatorConfig,
    choices: Vec<Choice>,
    context: String,
}

impl<'a> ParametersInterface<'a> {
    pub fn new(parameters: &'a mut Vec<Parameter>, revision: Revision) -> Self {
        ParametersInterface {
            parameters,
            revision,
            config: EvaluatorConfig::default(),
            choices: Vec::new(),
            context: String::new(),
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Choices that `choiceRef`s of the parameters resolve against.
    pub fn with_choices(mut self, choices: &[Choice]) -> Self {
        self.choices = choices.to_vec();
        self
    }

    /// Name of the owning item, used in validation messages.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn count(&self) -> usize {
        self.parameters.len()
    }

    pub fn names(&self) -> Vec<String> {
        common::names(self.parameters.as_slice())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        common::index_of(self.parameters.as_slice(), name)
    }

    pub fn parameter(&self, name: &str) -> Result<&Parameter> {
        common::item(self.parameters.as_slice(), name)
    }

    /// Insert a parameter with a fresh valueId and a name derived from
    /// `base`, at `index` or at the end. Returns the name used.
    pub fn add(&mut self, index: Option<usize>, base: &str) -> String {
        let name = common::unique_name(base, |candidate| self.index_of(candidate).is_some());
        let parameter = Parameter::new(name.clone(), "");
        debug!(name = %name, value_id = %parameter.value_id, "adding parameter");
        let index = index.unwrap_or(self.parameters.len()).min(self.parameters.len());
        self.parameters.insert(index, parameter);
        name
    }

    pub fn remove(&mut self, name: &str) -> Result<Parameter> {
        let index = common::position(self.parameters.as_slice(), name)?;
        Ok(self.parameters.remove(index))
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let taken: Vec<String> = self.names();
        common::rename(self.parameters.as_mut_slice(), old, new, |candidate| {
            taken.iter().any(|name| name == candidate)
        })
    }

    pub fn value_id(&self, name: &str) -> Result<&str> {
        Ok(&self.parameter(name)?.value_id)
    }

    /// Raw and evaluated form of one attribute.
    pub fn expression(&self, name: &str, attribute: ParameterExpression) -> Result<ExpressionValue> {
        let parameter = self.parameter(name)?;
        let finder = DocumentParameterFinder::from_parameters(self.parameters.as_slice());
        let evaluator = ExpressionEvaluator::with_config(&finder, self.config);
        Ok(ExpressionValue::evaluate(&evaluator, attribute.get(parameter)))
    }

    pub fn set_expression(&mut self, name: &str, attribute: ParameterExpression, expression: &str) -> Result<()> {
        let parameter = common::item_mut(self.parameters.as_mut_slice(), name)?;
        *attribute.get_mut(parameter) = expression.to_string();
        Ok(())
    }

    /// Validation messages for one parameter.
    pub fn errors(&self, name: &str) -> Result<Vec<String>> {
        let parameter = self.parameter(name)?;
        let finder = DocumentParameterFinder::from_parameters(self.parameters.as_slice());
        let env = ValidationEnv::new(ExpressionEvaluator::with_config(&finder, self.config), self.revision)
            .with_choices(&self.choices);
        let mut errors = Vec::new();
        ParameterValidator::new(&env).find_errors_in(&mut errors, parameter, &self.context);
        Ok(errors)
    }

    pub fn is_valid(&self, name: &str) -> Result<bool> {
        Ok(self.errors(name)?.is_empty())
    }

    /// Whether every parameter is valid and all names are unique.
    pub fn all_valid(&self) -> bool {
        let names = self.names();
        let unique = names
            .iter()
            .enumerate()
            .all(|(index, name)| !names[..index].contains(name));
        unique && names.iter().all(|name| self.is_valid(name).unwrap_or(false))
    }

    /// valueIds mentioned by the expressions of one parameter.
    pub fn referenced_ids(&self, name: &str) -> Result<Vec<String>> {
        Ok(common::ids_referenced_by(self.parameter(name)?))
    }

    /// How often the valueId of `name` is mentioned by the parameters of
    /// this list.
    pub fn reference_count(&self, name: &str) -> Result<usize> {
        let id = self.value_id(name)?;
        Ok(common::count_in_all(self.parameters.as_slice(), id))
    }

    /// How often the valueId of `name` is mentioned in `tree`.
    pub fn usage_in(&self, name: &str, tree: &dyn HasExpressions) -> Result<usize> {
        Ok(ReferenceCounter::count(tree, self.value_id(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use ipxact_core::Register;

    fn parameter(name: &str, id: &str, value: &str) -> Parameter {
        let mut parameter = Parameter::new(name, value);
        parameter.value_id = id.into();
        parameter
    }

    fn list() -> Vec<Parameter> {
        vec![
            parameter("width", "width_id", "32"),
            parameter("bytes", "bytes_id", "width_id / 8"),
        ]
    }

    #[test]
    fn expressions_resolve_against_siblings() {
        let mut parameters = list();
        let interface = ParametersInterface::new(&mut parameters, Revision::Std22);
        let bytes = interface.expression("bytes", ParameterExpression::Value).unwrap();
        assert_eq!(bytes.expression, "width_id / 8");
        assert_eq!(bytes.value, "4");
        assert_eq!(interface.expression("bytes", ParameterExpression::Minimum).unwrap().value, "");
    }

    #[test]
    fn add_picks_unique_names_and_fresh_ids() {
        let mut parameters = list();
        let mut interface = ParametersInterface::new(&mut parameters, Revision::Std22);
        assert_eq!(interface.add(None, "width"), "width_1");
        assert_eq!(interface.add(Some(0), "depth"), "depth");
        assert_eq!(interface.names(), ["depth", "width", "bytes", "width_1"]);
        assert_ne!(interface.value_id("depth").unwrap(), interface.value_id("width_1").unwrap());
    }

    #[test]
    fn rename_and_remove() {
        let mut parameters = list();
        let mut interface = ParametersInterface::new(&mut parameters, Revision::Std22);
        assert!(matches!(interface.rename("bytes", "width"), Err(ApiError::DuplicateName(_))));
        interface.rename("bytes", "size").unwrap();
        assert_eq!(interface.index_of("size"), Some(1));
        assert_eq!(interface.remove("width").unwrap().value_id, "width_id");
        assert!(matches!(interface.remove("width"), Err(ApiError::ItemNotFound(_))));
        assert_eq!(interface.count(), 1);
    }

    #[test]
    fn validation_goes_through_the_parameter_validator() {
        let mut parameters = list();
        let mut interface = ParametersInterface::new(&mut parameters, Revision::Std22).with_context("component c");
        assert!(interface.all_valid());

        interface.set_expression("width", ParameterExpression::Value, "").unwrap();
        assert_eq!(
            interface.errors("width").unwrap(),
            ["No value specified for parameter width within component c"]
        );
        assert!(!interface.all_valid());
    }

    #[test]
    fn references_are_counted_in_the_list_and_in_other_trees() {
        let mut parameters = list();
        let interface = ParametersInterface::new(&mut parameters, Revision::Std22);
        assert_eq!(interface.referenced_ids("bytes").unwrap(), ["width_id"]);
        assert_eq!(interface.reference_count("width").unwrap(), 1);
        assert_eq!(interface.reference_count("bytes").unwrap(), 0);

        let register = Register::new("r", "0", "width_id + width_id");
        assert_eq!(interface.usage_in("width", &register).unwrap(), 2);
    }
}
