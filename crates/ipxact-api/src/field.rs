//! Name-indexed access to the fields of a register.

use ipxact_core::{AccessType, Field, FieldReset, ReferenceCounter};
use ipxact_validate::{FieldValidator, ValidationEnv, Validator};
use tracing::debug;

use crate::common::{self, ExpressionValue};
use crate::error::Result;

/// Expression-valued attributes of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldExpression {
    BitOffset,
    BitWidth,
    IsPresent,
    Reserved,
    /// Value of the first reset.
    ResetValue,
    /// Mask of the first reset.
    ResetMask,
}

impl FieldExpression {
    fn get(self, field: &Field) -> &str {
        match self {
            FieldExpression::BitOffset => &field.bit_offset,
            FieldExpression::BitWidth => &field.bit_width,
            FieldExpression::IsPresent => &field.is_present,
            FieldExpression::Reserved => &field.reserved,
            FieldExpression::ResetValue => field.resets.first().map_or("", |reset| reset.value.as_str()),
            FieldExpression::ResetMask => field.resets.first().map_or("", |reset| reset.mask.as_str()),
        }
    }

    /// Setting a reset expression on a field without resets adds one.
    fn set(self, field: &mut Field, expression: String) {
        match self {
            FieldExpression::BitOffset => field.bit_offset = expression,
            FieldExpression::BitWidth => field.bit_width = expression,
            FieldExpression::IsPresent => field.is_present = expression,
            FieldExpression::Reserved => field.reserved = expression,
            FieldExpression::ResetValue | FieldExpression::ResetMask => {
                if field.resets.is_empty() {
                    if expression.is_empty() {
                        return;
                    }
                    field.resets.push(FieldReset::default());
                }
                let reset = &mut field.resets[0];
                if self == FieldExpression::ResetValue {
                    reset.value = expression;
                } else {
                    reset.mask = expression;
                }
            }
        }
    }
}

/// Editor facade over the fields of one register.
///
/// The evaluator of `env` must not borrow the register being edited;
/// build its finder from a copy of the relevant parameters.
#[derive(Debug)]
pub struct FieldInterface<'a, 'f> {
    fields: &'a mut Vec<Field>,
    env: ValidationEnv<'f>,
    context: String,
}

impl<'a, 'f> FieldInterface<'a, 'f> {
    pub fn new(fields: &'a mut Vec<Field>, env: ValidationEnv<'f>) -> Self {
        FieldInterface {
            fields,
            env,
            context: String::new(),
        }
    }

    /// Name of the containing register, used in validation messages.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }

    pub fn names(&self) -> Vec<String> {
        common::names(self.fields.as_slice())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        common::index_of(self.fields.as_slice(), name)
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        common::item(self.fields.as_slice(), name)
    }

    /// First bit above every field whose offset and width evaluate.
    pub fn next_free_bit(&self) -> i128 {
        let evaluator = self.env.evaluator();
        self.fields
            .iter()
            .filter_map(|field| {
                let offset = evaluator.evaluate_int(&field.bit_offset).ok()?;
                let width = evaluator.evaluate_int(&field.bit_width).ok()?;
                offset.checked_add(width)
            })
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Insert a one-bit field named after `base` above the existing fields,
    /// at `index` or at the end. Returns the name used.
    pub fn add(&mut self, index: Option<usize>, base: &str) -> String {
        let name = common::unique_name(base, |candidate| self.index_of(candidate).is_some());
        let offset = self.next_free_bit();
        debug!(name = %name, offset, "adding field");
        let index = index.unwrap_or(self.fields.len()).min(self.fields.len());
        self.fields.insert(index, Field::new(name.clone(), offset.to_string(), "1"));
        name
    }

    pub fn remove(&mut self, name: &str) -> Result<Field> {
        let index = common::position(self.fields.as_slice(), name)?;
        Ok(self.fields.remove(index))
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let taken = self.names();
        common::rename(self.fields.as_mut_slice(), old, new, |candidate| {
            taken.iter().any(|name| name == candidate)
        })
    }

    /// Raw and evaluated form of one attribute.
    pub fn expression(&self, name: &str, attribute: FieldExpression) -> Result<ExpressionValue> {
        let field = self.field(name)?;
        Ok(ExpressionValue::evaluate(self.env.evaluator(), attribute.get(field)))
    }

    pub fn set_expression(&mut self, name: &str, attribute: FieldExpression, expression: &str) -> Result<()> {
        let field = common::item_mut(self.fields.as_mut_slice(), name)?;
        attribute.set(field, expression.to_string());
        Ok(())
    }

    pub fn access(&self, name: &str) -> Result<Option<AccessType>> {
        Ok(self.field(name)?.access)
    }

    pub fn set_access(&mut self, name: &str, access: Option<AccessType>) -> Result<()> {
        common::item_mut(self.fields.as_mut_slice(), name)?.access = access;
        Ok(())
    }

    pub fn volatile(&self, name: &str) -> Result<Option<bool>> {
        Ok(self.field(name)?.volatile)
    }

    pub fn set_volatile(&mut self, name: &str, volatile: Option<bool>) -> Result<()> {
        common::item_mut(self.fields.as_mut_slice(), name)?.volatile = volatile;
        Ok(())
    }

    /// Validation messages for one field.
    pub fn errors(&self, name: &str) -> Result<Vec<String>> {
        let field = self.field(name)?;
        let mut errors = Vec::new();
        FieldValidator::new(&self.env).find_errors_in(&mut errors, field, &self.context);
        Ok(errors)
    }

    pub fn is_valid(&self, name: &str) -> Result<bool> {
        Ok(self.errors(name)?.is_empty())
    }

    /// Whether every field is valid and all names are unique.
    pub fn all_valid(&self) -> bool {
        let validator = FieldValidator::new(&self.env);
        let names = self.names();
        names
            .iter()
            .enumerate()
            .all(|(index, name)| !names[..index].contains(name))
            && self.fields.iter().all(|field| validator.validate(field))
    }

    /// valueIds mentioned by one field and its children.
    pub fn referenced_ids(&self, name: &str) -> Result<Vec<String>> {
        Ok(common::ids_referenced_by(self.field(name)?))
    }

    /// Mentions of `id` in one field and its children.
    pub fn reference_count(&self, name: &str, id: &str) -> Result<usize> {
        Ok(ReferenceCounter::count(self.field(name)?, id))
    }

    /// Mentions of `id` across all fields.
    pub fn total_references(&self, id: &str) -> usize {
        common::count_in_all(self.fields.as_slice(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipxact_core::{DocumentParameterFinder, Parameter, Revision};
    use ipxact_expr::{ExpressionEvaluator, NullFinder};
    use rstest::rstest;

    fn env(revision: Revision) -> ValidationEnv<'static> {
        ValidationEnv::new(ExpressionEvaluator::new(&NullFinder), revision)
    }

    fn fields() -> Vec<Field> {
        vec![Field::new("enable", "0", "1"), Field::new("mode", "1", "3")]
    }

    #[test]
    fn add_places_new_fields_above_the_others() {
        let mut fields = fields();
        let mut interface = FieldInterface::new(&mut fields, env(Revision::Std14));
        assert_eq!(interface.add(None, "field"), "field");
        assert_eq!(interface.add(None, "field"), "field_1");
        assert_eq!(interface.expression("field", FieldExpression::BitOffset).unwrap().value, "4");
        assert_eq!(interface.expression("field_1", FieldExpression::BitOffset).unwrap().value, "5");
        assert_eq!(interface.count(), 4);
    }

    #[test]
    fn fields_ending_past_the_integer_range_do_not_place_new_ones() {
        let mut fields = fields();
        fields.push(Field::new("huge", "2**126", "2**126"));
        let interface = FieldInterface::new(&mut fields, env(Revision::Std14));
        assert_eq!(interface.next_free_bit(), 4);
    }

    #[test]
    fn expressions_are_formatted_through_the_evaluator() {
        let parameters = vec![{
            let mut width = Parameter::new("width", "3");
            width.value_id = "width_id".into();
            width
        }];
        let finder = DocumentParameterFinder::from_parameters(&parameters);
        let env = ValidationEnv::new(ExpressionEvaluator::new(&finder), Revision::Std22);

        let mut fields = fields();
        let mut interface = FieldInterface::new(&mut fields, env);
        interface.set_expression("mode", FieldExpression::BitWidth, "width_id").unwrap();
        let width = interface.expression("mode", FieldExpression::BitWidth).unwrap();
        assert_eq!(width.expression, "width_id");
        assert_eq!(width.value, "3");

        interface.set_expression("mode", FieldExpression::BitOffset, "missing_id").unwrap();
        assert_eq!(interface.expression("mode", FieldExpression::BitOffset).unwrap().value, "x");
    }

    #[test]
    fn reset_setters_create_the_first_reset() {
        let mut fields = fields();
        let mut interface = FieldInterface::new(&mut fields, env(Revision::Std22));
        assert_eq!(interface.expression("enable", FieldExpression::ResetValue).unwrap().expression, "");
        interface.set_expression("enable", FieldExpression::ResetMask, "").unwrap();
        assert!(interface.field("enable").unwrap().resets.is_empty());

        interface.set_expression("enable", FieldExpression::ResetValue, "'h1").unwrap();
        assert_eq!(interface.expression("enable", FieldExpression::ResetValue).unwrap().value, "1");
        assert_eq!(interface.field("enable").unwrap().resets.len(), 1);
    }

    #[rstest]
    #[case(FieldExpression::BitOffset, "-1", "Invalid bit offset set for field mode within register ctrl")]
    #[case(FieldExpression::BitWidth, "0", "Invalid bit width set for field mode within register ctrl")]
    fn errors_name_the_register(#[case] attribute: FieldExpression, #[case] expression: &str, #[case] message: &str) {
        let mut fields = fields();
        let mut interface = FieldInterface::new(&mut fields, env(Revision::Std14)).with_context("register ctrl");
        assert!(interface.all_valid());
        interface.set_expression("mode", attribute, expression).unwrap();
        assert_eq!(interface.errors("mode").unwrap(), [message]);
        assert!(!interface.is_valid("mode").unwrap());
        assert!(!interface.all_valid());
    }

    #[test]
    fn typed_flags() {
        let mut fields = fields();
        let mut interface = FieldInterface::new(&mut fields, env(Revision::Std14));
        interface.set_access("enable", Some(AccessType::ReadOnly)).unwrap();
        interface.set_volatile("enable", Some(true)).unwrap();
        assert_eq!(interface.access("enable").unwrap(), Some(AccessType::ReadOnly));
        assert_eq!(interface.volatile("enable").unwrap(), Some(true));
        assert_eq!(interface.volatile("mode").unwrap(), None);
        assert!(interface.set_access("none", None).is_err());
    }

    #[test]
    fn references() {
        let mut fields = fields();
        fields[1].bit_width = "width_id".into();
        fields[1].resets.push(FieldReset::new("width_id - 1"));
        let interface = FieldInterface::new(&mut fields, env(Revision::Std22));
        assert_eq!(interface.referenced_ids("mode").unwrap(), ["width_id"]);
        assert_eq!(interface.reference_count("mode", "width_id").unwrap(), 2);
        assert_eq!(interface.reference_count("enable", "width_id").unwrap(), 0);
        assert_eq!(interface.total_references("width_id"), 2);
    }
}
