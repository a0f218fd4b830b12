//! Register, alternate register, and register file validation, plus the
//! register-data rules shared with address blocks.

use std::collections::HashSet;

use ipxact_core::{AccessType, AlternateRegister, Field, Register, RegisterData, RegisterFile};

use crate::common::{
    access_is_compatible, access_text, array_element_count, find_duplicates, find_errors_in_access_policies,
    find_errors_in_is_present, find_errors_in_memory_array, find_errors_in_parameters, has_valid_name,
    is_non_negative, is_positive, is_present, last_address, MemoryReserve, ModeRefCheck,
};
use crate::field::FieldValidator;
use crate::{ValidationEnv, Validator};

/// The register or alternate register whose fields are checked together.
struct FieldOwner<'o> {
    /// Name used in containment messages.
    name: &'o str,
    /// Context of the fields, e.g. `register ctrl`.
    label: String,
    size: Option<i128>,
    volatile: Option<bool>,
    access: Option<AccessType>,
}

/// Whether two fields sharing a type identifier describe the same field.
fn fields_share_definition(first: &Field, second: &Field) -> bool {
    first.bit_width == second.bit_width
        && first.volatile == second.volatile
        && first.access == second.access
        && first.enumerated_values == second.enumerated_values
        && first.modified_write_value == second.modified_write_value
        && first.write_value_constraint == second.write_value_constraint
        && first.read_action == second.read_action
        && first.testable == second.testable
        && first.reserved == second.reserved
        && first.field_access_policies == second.field_access_policies
}

/// Whether two registers sharing a type identifier describe the same register.
fn registers_share_definition(first: &Register, second: &Register) -> bool {
    first.size == second.size
        && first.volatile == second.volatile
        && first.access == second.access
        && first.access_policies == second.access_policies
        && first.fields.len() == second.fields.len()
        && first
            .fields
            .iter()
            .zip(&second.fields)
            .all(|(a, b)| a.name_group.name == b.name_group.name && fields_share_definition(a, b))
}

/// Checks one register and everything it contains.
///
/// The context names the container, e.g. `address block regs`.
#[derive(Debug, Clone, Copy)]
pub struct RegisterValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> RegisterValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        RegisterValidator { env }
    }

    pub fn has_valid_address_offset(&self, register: &Register) -> bool {
        is_non_negative(self.env, &register.address_offset)
    }

    /// Std22 registers referencing a definition take their size from it.
    pub fn has_valid_size(&self, register: &Register) -> bool {
        if self.env.is_std22() && register.register_definition_ref.is_some() {
            return register.size.trim().is_empty() || is_positive(self.env, &register.size);
        }
        is_positive(self.env, &register.size)
    }

    fn find_errors_in_fields(&self, errors: &mut Vec<String>, fields: &[Field], owner: &FieldOwner<'_>) {
        let validator = FieldValidator::new(self.env);
        for field in fields {
            validator.find_errors_in(errors, field, &owner.label);
        }
        find_duplicates(fields.iter().map(|f| f.name_group.name.as_str()), |name| {
            errors.push(format!("Name {name} of fields in {} is not unique.", owner.label));
        });

        let mut reserve = MemoryReserve::new();
        for field in fields {
            let name = &field.name_group.name;
            let span = self.env.int(&field.bit_width).and_then(|width| {
                width.checked_mul(array_element_count(self.env, field.memory_array.as_ref())?)
            });
            if let (Some(offset), Some(span)) = (self.env.int(&field.bit_offset), span) {
                let last_bit = last_address(offset, span);
                let contained = |size: i128| offset >= 0 && last_bit.is_some_and(|last| last < size);
                if owner.size.is_some_and(|size| !contained(size)) {
                    errors.push(format!("Field {name} is not contained within {}", owner.name));
                }
                if let Some(last_bit) = last_bit.filter(|_| is_present(self.env, &field.is_present)) {
                    reserve.add_area(name, offset, last_bit);
                }
            }

            if owner.volatile == Some(false) && field.volatile == Some(true) {
                errors.push(format!(
                    "Volatile cannot be set to false in {}, where contained field {name} has volatile true",
                    owner.label
                ));
            }
            if self.env.is_std14() && !access_is_compatible(owner.access, field.access) {
                errors.push(format!(
                    "Access cannot be set to {} in field {name}, where containing {} has access {}",
                    access_text(field.access),
                    owner.label,
                    access_text(owner.access)
                ));
            }
        }
        reserve.find_errors_in_overlap(errors, "Fields", &owner.label);

        for (index, field) in fields.iter().enumerate() {
            if field.type_identifier.is_empty() {
                continue;
            }
            let first_with_type = fields[..index]
                .iter()
                .find(|earlier| earlier.type_identifier == field.type_identifier);
            if let Some(first) = first_with_type {
                if !fields_share_definition(first, field) {
                    errors.push(format!(
                        "Fields {} and {} have type identifier {}, but different field definitions within {}",
                        first.name_group.name, field.name_group.name, field.type_identifier, owner.label
                    ));
                }
            }
        }
    }

    fn find_errors_in_alternates(&self, errors: &mut Vec<String>, register: &Register, size: Option<i128>) {
        let name = &register.name_group.name;
        find_duplicates(
            register.alternate_registers.iter().map(|a| a.name_group.name.as_str()),
            |duplicate| {
                errors.push(format!(
                    "Name {duplicate} of alternate registers in register {name} is not unique."
                ));
            },
        );

        let mut mode_refs = ModeRefCheck::new();
        for alternate in &register.alternate_registers {
            self.find_errors_in_alternate(errors, alternate, name, size, &mut mode_refs);
        }
    }

    fn find_errors_in_alternate(
        &self,
        errors: &mut Vec<String>,
        alternate: &AlternateRegister,
        register_name: &str,
        size: Option<i128>,
        mode_refs: &mut ModeRefCheck,
    ) {
        let name = &alternate.name_group.name;
        let context = format!("alternate register {name} within register {register_name}");

        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &alternate.is_present, &context);
            let mut groups = HashSet::new();
            let groups_valid = !alternate.alternate_groups.is_empty()
                && alternate
                    .alternate_groups
                    .iter()
                    .all(|group| has_valid_name(group) && groups.insert(group.as_str()));
            if !groups_valid {
                errors.push(format!("Alternate groups are not unique or not empty in {context}"));
            }
        } else if self.env.is_std22() {
            if alternate.mode_refs.is_empty() {
                errors.push(format!(
                    "Alternate register {name} within register {register_name} must have at least one mode reference defined."
                ));
            }
            mode_refs.find_errors_in(
                errors,
                self.env,
                &alternate.mode_refs,
                &format!("alternate registers of register {register_name}"),
            );
            find_errors_in_access_policies(errors, self.env, &alternate.access_policies, &context);
        }

        if alternate.fields.is_empty() {
            errors.push(format!("Alternate register {name} within register {register_name} must contain at least one field"));
        }
        let owner = FieldOwner {
            name,
            label: format!("alternate register {name}"),
            size,
            volatile: alternate.volatile,
            access: alternate.access,
        };
        self.find_errors_in_fields(errors, &alternate.fields, &owner);
        find_errors_in_parameters(errors, self.env, &alternate.parameters, &owner.label);
    }
}

impl Validator<Register> for RegisterValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, register: &Register, context: &str) {
        let name = &register.name_group.name;
        let complete = format!("register '{name}' within {context}");
        let defined_elsewhere = self.env.is_std22() && register.register_definition_ref.is_some();

        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for {complete}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &register.is_present, &complete);
        }
        find_errors_in_memory_array(errors, self.env, register.memory_array.as_ref(), &complete);
        if !self.has_valid_address_offset(register) {
            errors.push(format!("Invalid address offset set for {complete}"));
        }
        if !self.has_valid_size(register) {
            errors.push(format!("Invalid size specified for {complete}"));
        }

        if self.env.is_std22() {
            if register.register_definition_ref.is_some() && register.has_definition_values() {
                errors.push(format!(
                    "Register {name} in {context} contains both a register definition reference and register definition values."
                ));
            }
            find_errors_in_access_policies(errors, self.env, &register.access_policies, &complete);
        }

        let size = self.env.int(&register.size);
        let owner = FieldOwner {
            name,
            label: format!("register {name}"),
            size,
            volatile: register.volatile,
            access: register.access,
        };
        if register.fields.is_empty() && !defined_elsewhere {
            errors.push(format!("Register {name} must contain at least one field"));
        }
        self.find_errors_in_fields(errors, &register.fields, &owner);
        self.find_errors_in_alternates(errors, register, size);
        find_errors_in_parameters(errors, self.env, &register.parameters, &owner.label);
    }
}

/// Size in address units of one register-data entry, arrays included.
///
/// `None` when the size does not evaluate or does not fit an `i128`.
pub(crate) fn register_data_span(env: &ValidationEnv<'_>, item: &RegisterData, address_unit_bits: i128) -> Option<i128> {
    let elements = array_element_count(env, item.memory_array())?;
    let unit = match item {
        RegisterData::Register(register) => {
            let size = env.int(&register.size)?;
            size.checked_add(address_unit_bits - 1)? / address_unit_bits
        }
        RegisterData::RegisterFile(register_file) => env.int(&register_file.range)?,
    };
    unit.checked_mul(elements)
}

/// The container of a register-data list: an address block or a
/// register file.
pub(crate) struct RegisterDataOwner<'o> {
    /// Complete context, e.g. `address block 'regs' within memory map m`.
    pub complete: &'o str,
    /// Context handed to the children, e.g. `address block regs`.
    pub child_context: &'o str,
    /// Range in address units, when it evaluates.
    pub range: Option<i128>,
    pub address_unit_bits: i128,
}

/// Rules every register-data list follows: valid children, unique names,
/// children inside the owner's range, and no overlapping children.
pub(crate) fn find_errors_in_register_data(
    errors: &mut Vec<String>,
    env: &ValidationEnv<'_>,
    data: &[RegisterData],
    owner: &RegisterDataOwner<'_>,
) {
    let register_validator = RegisterValidator::new(env);
    let register_file_validator = RegisterFileValidator::new(env).with_address_unit_bits(owner.address_unit_bits);
    for item in data {
        match item {
            RegisterData::Register(register) => {
                register_validator.find_errors_in(errors, register, owner.child_context)
            }
            RegisterData::RegisterFile(register_file) => {
                register_file_validator.find_errors_in(errors, register_file, owner.child_context)
            }
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for item in data {
        let name = item.name();
        if !seen.insert(name) && reported.insert(name) {
            let kind = match item {
                RegisterData::Register(_) => "registers",
                RegisterData::RegisterFile(_) => "register files",
            };
            errors.push(format!("Name {name} of {kind} in {} is not unique.", owner.complete));
        }
    }

    let mut reserve = MemoryReserve::new();
    for item in data {
        let (Some(offset), Some(span)) = (env.int(item.address_offset()), register_data_span(env, item, owner.address_unit_bits))
        else {
            continue;
        };
        let last = last_address(offset, span);
        if owner.range.is_some_and(|range| last.map_or(true, |last| last >= range)) {
            let kind = match item {
                RegisterData::Register(_) => "Register",
                RegisterData::RegisterFile(_) => "Register file",
            };
            errors.push(format!("{kind} {} is not contained within {}", item.name(), owner.complete));
        }
        if let Some(last) = last.filter(|_| is_present(env, item.is_present())) {
            reserve.add_area(item.name(), offset, last);
        }
    }
    reserve.find_errors_in_overlap(errors, "Register data", owner.complete);

    let registers: Vec<&Register> = data.iter().filter_map(RegisterData::as_register).collect();
    let mut mismatched_types = HashSet::new();
    for (index, register) in registers.iter().enumerate() {
        if register.type_identifier.is_empty() || mismatched_types.contains(register.type_identifier.as_str()) {
            continue;
        }
        let first = registers[..index]
            .iter()
            .find(|earlier| earlier.type_identifier == register.type_identifier);
        if first.is_some_and(|first| !registers_share_definition(first, register)) {
            mismatched_types.insert(register.type_identifier.as_str());
            errors.push(format!(
                "Registers containing the same type identifiers must contain similar register definitions within {}",
                owner.complete
            ));
        }
    }
}

/// Checks one register file and everything it contains.
#[derive(Debug, Clone, Copy)]
pub struct RegisterFileValidator<'a> {
    env: &'a ValidationEnv<'a>,
    address_unit_bits: i128,
}

impl<'a> RegisterFileValidator<'a> {
    /// A validator assuming 8-bit address units.
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        RegisterFileValidator {
            env,
            address_unit_bits: 8,
        }
    }

    /// Use the address unit bits of the containing memory map. Values
    /// below one fall back to 8.
    pub fn with_address_unit_bits(mut self, address_unit_bits: i128) -> Self {
        self.address_unit_bits = if address_unit_bits > 0 { address_unit_bits } else { 8 };
        self
    }

    pub fn has_valid_range(&self, register_file: &RegisterFile) -> bool {
        if self.env.is_std22() && register_file.register_file_definition_ref.is_some() {
            return register_file.range.trim().is_empty() || is_positive(self.env, &register_file.range);
        }
        is_positive(self.env, &register_file.range)
    }
}

impl Validator<RegisterFile> for RegisterFileValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, register_file: &RegisterFile, context: &str) {
        let name = &register_file.name_group.name;
        let complete = format!("register file '{name}' within {context}");
        let defined_elsewhere = self.env.is_std22() && register_file.register_file_definition_ref.is_some();

        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for {complete}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &register_file.is_present, &complete);
        }
        find_errors_in_memory_array(errors, self.env, register_file.memory_array.as_ref(), &complete);
        if !is_non_negative(self.env, &register_file.address_offset) {
            errors.push(format!("Invalid address offset set for {complete}"));
        }
        if !self.has_valid_range(register_file) {
            errors.push(format!("Invalid range specified for register file {name} within {context}"));
        }

        if self.env.is_std22() {
            if register_file.register_file_definition_ref.is_some() && register_file.has_definition_values() {
                errors.push(format!(
                    "Register file '{name}' in {context} contains both a register file definition reference and register file definition values."
                ));
            }
            find_errors_in_access_policies(errors, self.env, &register_file.access_policies, &complete);
        }

        let child_context = format!("register file {name}");
        if register_file.register_data.is_empty() && !defined_elsewhere {
            errors.push(format!(
                "Register file {name} within {context} must contain at least one register or register file"
            ));
        }
        let owner = RegisterDataOwner {
            complete: &complete,
            child_context: &child_context,
            range: self.env.int(&register_file.range),
            address_unit_bits: self.address_unit_bits,
        };
        find_errors_in_register_data(errors, self.env, &register_file.register_data, &owner);
        find_errors_in_parameters(errors, self.env, &register_file.parameters, &child_context);
    }
}
