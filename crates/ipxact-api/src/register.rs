//! Name-indexed access to the registers of a register-data list.
//!
//! Registers share one namespace with the register files of the same list,
//! so adding and renaming check both kinds. Only registers are listed.

use ipxact_core::{AccessType, Dimension, MemoryArray, ReferenceCounter, Register, RegisterData};
use ipxact_validate::{RegisterValidator, ValidationEnv, Validator};
use tracing::debug;

use crate::common::{self, ExpressionValue};
use crate::error::{ApiError, Result};
use crate::field::FieldInterface;

/// Expression-valued attributes of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterExpression {
    AddressOffset,
    Size,
    IsPresent,
    /// First array dimension.
    Dimension,
    Stride,
}

impl RegisterExpression {
    fn get(self, register: &Register) -> &str {
        let array = register.memory_array.as_ref();
        match self {
            RegisterExpression::AddressOffset => &register.address_offset,
            RegisterExpression::Size => &register.size,
            RegisterExpression::IsPresent => &register.is_present,
            RegisterExpression::Dimension => array
                .and_then(|array| array.dimensions.first())
                .map_or("", |dimension| dimension.value.as_str()),
            RegisterExpression::Stride => array.map_or("", |array| array.stride.as_str()),
        }
    }

    /// Setting an array expression on a plain register makes it an array.
    fn set(self, register: &mut Register, expression: String) {
        match self {
            RegisterExpression::AddressOffset => register.address_offset = expression,
            RegisterExpression::Size => register.size = expression,
            RegisterExpression::IsPresent => register.is_present = expression,
            RegisterExpression::Dimension => {
                let array = register.memory_array.get_or_insert_with(MemoryArray::default);
                match array.dimensions.first_mut() {
                    Some(dimension) => dimension.value = expression,
                    None => array.dimensions.push(Dimension::new(expression)),
                }
            }
            RegisterExpression::Stride => {
                register.memory_array.get_or_insert_with(MemoryArray::default).stride = expression;
            }
        }
    }
}

/// Editor facade over the registers of an address block or register file.
///
/// The evaluator of `env` must not borrow the list being edited.
#[derive(Debug)]
pub struct RegisterInterface<'a, 'f> {
    data: &'a mut Vec<RegisterData>,
    env: ValidationEnv<'f>,
    address_unit_bits: i128,
    context: String,
}

impl<'a, 'f> RegisterInterface<'a, 'f> {
    pub fn new(data: &'a mut Vec<RegisterData>, env: ValidationEnv<'f>) -> Self {
        RegisterInterface {
            data,
            env,
            address_unit_bits: 8,
            context: String::new(),
        }
    }

    /// Bits per address unit of the containing memory map.
    pub fn with_address_unit_bits(mut self, address_unit_bits: i128) -> Self {
        self.address_unit_bits = address_unit_bits;
        self
    }

    /// Name of the container, used in validation messages.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    fn registers(&self) -> impl Iterator<Item = &Register> {
        self.data.iter().filter_map(RegisterData::as_register)
    }

    fn is_taken(&self, name: &str) -> bool {
        self.data.iter().any(|entry| entry.name() == name)
    }

    /// Index of the register in the whole register-data list.
    fn data_index(&self, name: &str) -> Result<usize> {
        self.data
            .iter()
            .position(|entry| entry.as_register().is_some_and(|register| register.name_group.name == name))
            .ok_or_else(|| ApiError::ItemNotFound(name.to_string()))
    }

    fn register_mut(&mut self, name: &str) -> Result<&mut Register> {
        let index = self.data_index(name)?;
        self.data[index]
            .as_register_mut()
            .ok_or_else(|| ApiError::ItemNotFound(name.to_string()))
    }

    pub fn count(&self) -> usize {
        self.registers().count()
    }

    pub fn names(&self) -> Vec<String> {
        self.registers().map(|register| register.name_group.name.clone()).collect()
    }

    /// Index among the registers of the list.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.registers().position(|register| register.name_group.name == name)
    }

    pub fn register(&self, name: &str) -> Result<&Register> {
        self.registers()
            .find(|register| register.name_group.name == name)
            .ok_or_else(|| ApiError::ItemNotFound(name.to_string()))
    }

    /// Span of one entry in address units, when its expressions evaluate.
    fn span(&self, entry: &RegisterData) -> Option<i128> {
        let evaluator = self.env.evaluator();
        let elements = match entry.memory_array() {
            Some(array) => array
                .dimensions
                .iter()
                .map(|dimension| evaluator.evaluate_int(&dimension.value).unwrap_or(1))
                .try_fold(1_i128, i128::checked_mul)?,
            None => 1,
        };
        let single = match entry {
            RegisterData::Register(register) => {
                let bits = evaluator.evaluate_int(&register.size).ok()?;
                let unit = if self.address_unit_bits > 0 { self.address_unit_bits } else { 8 };
                bits.checked_add(unit - 1)? / unit
            }
            RegisterData::RegisterFile(register_file) => evaluator.evaluate_int(&register_file.range).ok()?,
        };
        single.checked_mul(elements)
    }

    /// First address offset above every entry whose offset and span evaluate.
    pub fn next_free_offset(&self) -> i128 {
        self.data
            .iter()
            .filter_map(|entry| {
                let offset = self.env.evaluator().evaluate_int(entry.address_offset()).ok()?;
                offset.checked_add(self.span(entry)?)
            })
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Append a 32-bit register named after `base` at the next free offset.
    /// Returns the name used.
    pub fn add(&mut self, base: &str) -> String {
        let name = common::unique_name(base, |candidate| self.is_taken(candidate));
        let offset = format!("'h{:X}", self.next_free_offset());
        debug!(name = %name, offset = %offset, "adding register");
        self.data.push(Register::new(name.clone(), offset, "32").into());
        name
    }

    pub fn remove(&mut self, name: &str) -> Result<Register> {
        let index = self.data_index(name)?;
        match self.data.remove(index) {
            RegisterData::Register(register) => Ok(register),
            RegisterData::RegisterFile(_) => Err(ApiError::ItemNotFound(name.to_string())),
        }
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        self.data_index(old)?;
        if old == new {
            return Ok(());
        }
        if self.is_taken(new) {
            return Err(ApiError::DuplicateName(new.to_string()));
        }
        self.register_mut(old)?.name_group.name = new.to_string();
        Ok(())
    }

    /// Raw and evaluated form of one attribute.
    pub fn expression(&self, name: &str, attribute: RegisterExpression) -> Result<ExpressionValue> {
        let register = self.register(name)?;
        Ok(ExpressionValue::evaluate(self.env.evaluator(), attribute.get(register)))
    }

    pub fn set_expression(&mut self, name: &str, attribute: RegisterExpression, expression: &str) -> Result<()> {
        let register = self.register_mut(name)?;
        attribute.set(register, expression.to_string());
        Ok(())
    }

    pub fn access(&self, name: &str) -> Result<Option<AccessType>> {
        Ok(self.register(name)?.access)
    }

    pub fn set_access(&mut self, name: &str, access: Option<AccessType>) -> Result<()> {
        self.register_mut(name)?.access = access;
        Ok(())
    }

    pub fn volatile(&self, name: &str) -> Result<Option<bool>> {
        Ok(self.register(name)?.volatile)
    }

    pub fn set_volatile(&mut self, name: &str, volatile: Option<bool>) -> Result<()> {
        self.register_mut(name)?.volatile = volatile;
        Ok(())
    }

    /// Facade over the fields of one register.
    pub fn fields(&mut self, name: &str) -> Result<FieldInterface<'_, 'f>> {
        let env = self.env.clone();
        let register = self.register_mut(name)?;
        let context = format!("register {}", register.name_group.name);
        Ok(FieldInterface::new(&mut register.fields, env).with_context(context))
    }

    /// Validation messages for one register and its contents.
    pub fn errors(&self, name: &str) -> Result<Vec<String>> {
        let register = self.register(name)?;
        let mut errors = Vec::new();
        RegisterValidator::new(&self.env).find_errors_in(&mut errors, register, &self.context);
        Ok(errors)
    }

    pub fn is_valid(&self, name: &str) -> Result<bool> {
        Ok(self.errors(name)?.is_empty())
    }

    /// Whether every register is valid and no name is used twice in the list.
    pub fn all_valid(&self) -> bool {
        let validator = RegisterValidator::new(&self.env);
        let names: Vec<&str> = self.data.iter().map(RegisterData::name).collect();
        names
            .iter()
            .enumerate()
            .all(|(index, name)| !names[..index].contains(name))
            && self.registers().all(|register| validator.validate(register))
    }

    /// valueIds mentioned by one register and its children.
    pub fn referenced_ids(&self, name: &str) -> Result<Vec<String>> {
        Ok(common::ids_referenced_by(self.register(name)?))
    }

    /// Mentions of `id` in one register and its children.
    pub fn reference_count(&self, name: &str, id: &str) -> Result<usize> {
        Ok(ReferenceCounter::count(self.register(name)?, id))
    }

    /// Mentions of `id` across all registers.
    pub fn total_references(&self, id: &str) -> usize {
        self.registers().map(|register| ReferenceCounter::count(register, id)).sum()
    }
}
