//! Component validation: modes, address spaces, CPUs, and memory maps.

use ipxact_core::{AddressSpace, Component, Cpu, Mode};

use crate::common::{
    find_duplicates, find_errors_in_document_data, find_errors_in_is_present, find_errors_in_parameters,
    has_valid_name, is_non_negative, is_positive,
};
use crate::memory::MemoryMapValidator;
use crate::{ValidationEnv, Validator};

/// Empty, or a positive integer.
fn has_valid_address_unit_bits(env: &ValidationEnv<'_>, expression: &str) -> bool {
    expression.trim().is_empty() || is_positive(env, expression)
}

/// Checks one mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> ModeValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        ModeValidator { env }
    }
}

impl Validator<Mode> for ModeValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, mode: &Mode, context: &str) {
        let name = &mode.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for mode {name} within {context}"));
        }
        if !self.env.evaluator().is_valid_expression(&mode.condition) {
            errors.push(format!("Invalid condition set for mode {name} within {context}"));
        }
    }
}

/// Checks one address space.
#[derive(Debug, Clone, Copy)]
pub struct AddressSpaceValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> AddressSpaceValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        AddressSpaceValidator { env }
    }
}

impl Validator<AddressSpace> for AddressSpaceValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, space: &AddressSpace, context: &str) {
        let name = &space.name_group.name;
        let subject = format!("address space {name} within {context}");
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for {subject}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &space.is_present, &subject);
        }
        if !is_positive(self.env, &space.range) {
            errors.push(format!("Invalid range set for {subject}"));
        }
        if !is_non_negative(self.env, &space.width) {
            errors.push(format!("Invalid width set for {subject}"));
        }
        if !has_valid_address_unit_bits(self.env, &space.address_unit_bits) {
            errors.push(format!("Invalid address unit bits set for {subject}"));
        }
        find_errors_in_parameters(errors, self.env, &space.parameters, &format!("address space {name}"));
    }
}

/// Checks one CPU.
///
/// Address space and memory map references resolve only after
/// [`ValidationEnv::component_change`].
#[derive(Debug, Clone, Copy)]
pub struct CpuValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> CpuValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        CpuValidator { env }
    }

    fn find_errors_in_address_space_refs(&self, errors: &mut Vec<String>, cpu: &Cpu, context: &str) {
        let name = &cpu.name_group.name;
        if cpu.address_space_refs.is_empty() {
            errors.push(format!("CPU {name} within {context} must reference at least one address space."));
        }
        for space_ref in &cpu.address_space_refs {
            let reference = &space_ref.reference;
            if !has_valid_name(reference) {
                errors.push(format!("Empty address space reference in CPU {name} within {context}."));
                continue;
            }
            if self
                .env
                .component()
                .is_some_and(|scope| !scope.address_space_names.contains(reference))
            {
                errors.push(format!(
                    "Address space '{reference}' referenced by CPU {name} within {context} does not exist."
                ));
            }
            find_errors_in_is_present(
                errors,
                self.env,
                &space_ref.is_present,
                &format!("address space reference {reference} in CPU {name} within {context}"),
            );
        }
    }

    fn find_errors_in_memory_layout(&self, errors: &mut Vec<String>, cpu: &Cpu, context: &str) {
        let name = &cpu.name_group.name;
        let subject = format!("CPU {name} within {context}");
        if !is_positive(self.env, &cpu.range) {
            errors.push(format!("Invalid range set for {subject}"));
        }
        if !is_non_negative(self.env, &cpu.width) {
            errors.push(format!("Invalid width set for {subject}"));
        }
        if !has_valid_address_unit_bits(self.env, &cpu.address_unit_bits) {
            errors.push(format!("Invalid address unit bits set for {subject}"));
        }

        let reference = &cpu.memory_map_ref;
        if !has_valid_name(reference) {
            errors.push(format!("No memory map reference set for {subject}"));
        } else if self
            .env
            .component()
            .is_some_and(|scope| !scope.memory_map_names.contains(reference))
        {
            errors.push(format!(
                "Memory map '{reference}' referenced by CPU {name} within {context} does not exist."
            ));
        }
    }
}

impl Validator<Cpu> for CpuValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, cpu: &Cpu, context: &str) {
        let name = &cpu.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for CPU {name} within {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &cpu.is_present, &format!("CPU {name} within {context}"));
            self.find_errors_in_address_space_refs(errors, cpu, context);
        } else if self.env.is_std22() {
            self.find_errors_in_memory_layout(errors, cpu, context);
        }
        find_errors_in_parameters(errors, self.env, &cpu.parameters, &format!("CPU {name}"));
    }
}

/// Checks a whole component.
///
/// The environment is scoped to the component before its items are
/// checked, so the revision, choices, and declared names come from the
/// component itself. The context argument is ignored in favor of
/// `component <vlnv>`.
#[derive(Debug, Clone, Copy)]
pub struct ComponentValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> ComponentValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        ComponentValidator { env }
    }
}

impl Validator<Component> for ComponentValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, component: &Component, _context: &str) {
        let env = self.env.for_component(component);
        let context = format!("component {}", component.vlnv());
        tracing::debug!(component = %component.vlnv(), revision = %env.revision(), "validating component");

        find_errors_in_document_data(errors, &env, &component.data, &context);

        let modes = ModeValidator::new(&env);
        for mode in &component.modes {
            modes.find_errors_in(errors, mode, &context);
        }
        find_duplicates(component.modes.iter().map(|m| m.name_group.name.as_str()), |name| {
            errors.push(format!("Mode name {name} within {context} is not unique."));
        });

        let spaces = AddressSpaceValidator::new(&env);
        for space in &component.address_spaces {
            spaces.find_errors_in(errors, space, &context);
        }
        find_duplicates(
            component.address_spaces.iter().map(|s| s.name_group.name.as_str()),
            |name| errors.push(format!("Address space name {name} within {context} is not unique.")),
        );

        let maps = MemoryMapValidator::new(&env);
        for map in &component.memory_maps {
            maps.find_errors_in(errors, map, &context);
        }
        find_duplicates(
            component.memory_maps.iter().map(|m| m.name_group.name.as_str()),
            |name| errors.push(format!("Memory map name {name} within {context} is not unique.")),
        );

        let cpus = CpuValidator::new(&env);
        for cpu in &component.cpus {
            cpus.find_errors_in(errors, cpu, &context);
        }
        find_duplicates(component.cpus.iter().map(|c| c.name_group.name.as_str()), |name| {
            errors.push(format!("CPU name {name} within {context} is not unique."));
        });
    }
}
