//! Memory map, address block, and subspace map validation.

use ipxact_core::{AddressBlock, MemoryBlock, MemoryMap, RegisterData, SubspaceMap, Usage};

use crate::common::{
    access_is_compatible, access_text, array_element_count, find_duplicates, find_errors_in_access_policies,
    find_errors_in_is_present, find_errors_in_memory_array, find_errors_in_parameters, has_valid_name,
    is_non_negative, is_positive, is_present, last_address, MemoryReserve,
};
use crate::register::{find_errors_in_register_data, RegisterDataOwner};
use crate::{ValidationEnv, Validator};

const DEFAULT_ADDRESS_UNIT_BITS: i128 = 8;

/// Checks one address block and the registers it contains.
#[derive(Debug, Clone, Copy)]
pub struct AddressBlockValidator<'a> {
    env: &'a ValidationEnv<'a>,
    address_unit_bits: i128,
}

impl<'a> AddressBlockValidator<'a> {
    /// A validator assuming 8-bit address units.
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        AddressBlockValidator {
            env,
            address_unit_bits: DEFAULT_ADDRESS_UNIT_BITS,
        }
    }

    /// Use the address unit bits of the containing memory map. Values
    /// below one fall back to 8.
    pub fn with_address_unit_bits(mut self, address_unit_bits: i128) -> Self {
        self.address_unit_bits = if address_unit_bits > 0 {
            address_unit_bits
        } else {
            DEFAULT_ADDRESS_UNIT_BITS
        };
        self
    }

    pub fn has_valid_base_address(&self, block: &AddressBlock) -> bool {
        is_non_negative(self.env, &block.base_address)
    }

    fn defined_elsewhere(&self, block: &AddressBlock) -> bool {
        self.env.is_std22() && block.address_block_definition_ref.is_some()
    }

    pub fn has_valid_range(&self, block: &AddressBlock) -> bool {
        self.defined_elsewhere(block) || is_positive(self.env, &block.range)
    }

    pub fn has_valid_width(&self, block: &AddressBlock) -> bool {
        self.defined_elsewhere(block) || is_non_negative(self.env, &block.width)
    }

    fn find_errors_in_usage(&self, errors: &mut Vec<String>, block: &AddressBlock, context: &str) {
        let name = &block.name_group.name;
        match block.usage {
            Some(Usage::Reserved) if block.register_data.iter().any(|item| item.as_register().is_some()) => {
                errors.push(format!(
                    "Registers cannot be contained in address block {name} with usage reserved within {context}"
                ));
            }
            Some(Usage::Memory) => {
                for register in block.register_data.iter().filter_map(RegisterData::as_register) {
                    if register.access.is_some() || register.volatile.is_some() {
                        errors.push(format!(
                            "Access and volatile values must be empty for register {} in address block {name} with usage memory within {context}",
                            register.name_group.name
                        ));
                    }
                }
            }
            _ => {}
        }
    }

    /// Register rules that depend on the block: width, volatility, access.
    fn find_errors_in_registers(&self, errors: &mut Vec<String>, block: &AddressBlock) {
        let name = &block.name_group.name;
        let width = self.env.int(&block.width);
        let mut volatile_reported = false;
        for register in block.register_data.iter().filter_map(RegisterData::as_register) {
            let register_name = &register.name_group.name;
            if let (Some(width), Some(size)) = (width, self.env.int(&register.size)) {
                if size > width {
                    errors.push(format!(
                        "Register {register_name} size must not be greater than the containing address block {name} width."
                    ));
                }
            }

            let volatile_inside =
                register.volatile == Some(true) || register.fields.iter().any(|field| field.volatile == Some(true));
            if block.volatile == Some(false) && volatile_inside && !volatile_reported {
                errors.push(format!(
                    "Volatile value cannot be set to false for address block {name} containing a register or register field with volatile true"
                ));
                volatile_reported = true;
            }

            if self.env.is_std14() && !access_is_compatible(block.access, register.access) {
                errors.push(format!(
                    "Access cannot be set to {} in register {register_name}, where containing address block {name} has access {}",
                    access_text(register.access),
                    access_text(block.access)
                ));
            }
        }
    }
}

impl Validator<AddressBlock> for AddressBlockValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, block: &AddressBlock, context: &str) {
        let name = &block.name_group.name;
        let complete = format!("address block '{name}' within {context}");

        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for address block {name} within {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &block.is_present, &complete);
        } else {
            find_errors_in_memory_array(errors, self.env, block.memory_array.as_ref(), &complete);
        }
        if !self.has_valid_base_address(block) {
            errors.push(format!("Invalid base address set for address block {name} within {context}"));
        }
        if !self.has_valid_range(block) {
            errors.push(format!("Invalid range set for address block {name} within {context}"));
        }
        if !self.has_valid_width(block) {
            errors.push(format!("Invalid width set for address block {name} within {context}"));
        }

        if self.env.is_std22() {
            if block.address_block_definition_ref.is_some() && block.has_definition_values() {
                errors.push(format!(
                    "Address block {name} in {context} must not be explicitly defined while also containing a definition reference."
                ));
            }
            find_errors_in_access_policies(errors, self.env, &block.access_policies, &complete);
        }

        self.find_errors_in_usage(errors, block, context);

        let child_context = format!("address block {name}");
        let owner = RegisterDataOwner {
            complete: &complete,
            child_context: &child_context,
            range: self.env.int(&block.range),
            address_unit_bits: self.address_unit_bits,
        };
        find_errors_in_register_data(errors, self.env, &block.register_data, &owner);
        self.find_errors_in_registers(errors, block);
        find_errors_in_parameters(errors, self.env, &block.parameters, &child_context);
    }
}

/// Checks one subspace map.
#[derive(Debug, Clone, Copy)]
pub struct SubspaceMapValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> SubspaceMapValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        SubspaceMapValidator { env }
    }
}

impl Validator<SubspaceMap> for SubspaceMapValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, map: &SubspaceMap, context: &str) {
        let name = &map.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for subspace map {name} within {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &map.is_present, &format!("subspace map {name} within {context}"));
        }
        if !is_non_negative(self.env, &map.base_address) {
            errors.push(format!("Invalid base address set for subspace map {name} within {context}"));
        }
        if !has_valid_name(&map.initiator_ref) {
            errors.push(format!("Invalid initiator reference set for subspace map {name} within {context}"));
        }
        find_errors_in_parameters(errors, self.env, &map.parameters, &format!("subspace map {name}"));
    }
}

/// Checks one memory map and all of its blocks.
#[derive(Debug, Clone, Copy)]
pub struct MemoryMapValidator<'a> {
    env: &'a ValidationEnv<'a>,
}

impl<'a> MemoryMapValidator<'a> {
    pub fn new(env: &'a ValidationEnv<'a>) -> Self {
        MemoryMapValidator { env }
    }

    /// Empty, or a positive integer.
    pub fn has_valid_address_unit_bits(&self, map: &MemoryMap) -> bool {
        map.address_unit_bits.trim().is_empty() || is_positive(self.env, &map.address_unit_bits)
    }

    /// Evaluated address unit bits, 8 when unset or invalid.
    pub fn address_unit_bits(&self, map: &MemoryMap) -> i128 {
        self.env
            .int(&map.address_unit_bits)
            .filter(|bits| *bits > 0)
            .unwrap_or(DEFAULT_ADDRESS_UNIT_BITS)
    }

    fn find_errors_in_overlap(&self, errors: &mut Vec<String>, map: &MemoryMap, context: &str) {
        let mut reserve = MemoryReserve::new();
        for block in map.blocks.iter().filter_map(MemoryBlock::as_address_block) {
            if !is_present(self.env, &block.is_present) {
                continue;
            }
            let (Some(base), Some(range)) = (self.env.int(&block.base_address), self.env.int(&block.range)) else {
                continue;
            };
            let last = array_element_count(self.env, block.memory_array.as_ref())
                .and_then(|count| range.checked_mul(count))
                .and_then(|span| last_address(base, span));
            if let Some(last) = last {
                reserve.add_area(&block.name_group.name, base, last);
            }
        }
        reserve.find_errors_in_overlap(errors, "Memory blocks", context);
    }
}

impl Validator<MemoryMap> for MemoryMapValidator<'_> {
    fn find_errors_in(&self, errors: &mut Vec<String>, map: &MemoryMap, context: &str) {
        let name = &map.name_group.name;
        if !has_valid_name(name) {
            errors.push(format!("Invalid name specified for memory map {name} within {context}"));
        }
        if self.env.is_std14() {
            find_errors_in_is_present(errors, self.env, &map.is_present, &format!("memory map {name} within {context}"));
        }
        if !self.has_valid_address_unit_bits(map) {
            errors.push(format!("Invalid address unit bits specified for memory map {name} within {context}"));
        }

        let block_context = format!("memory map {name}");
        let address_blocks = AddressBlockValidator::new(self.env).with_address_unit_bits(self.address_unit_bits(map));
        let subspace_maps = SubspaceMapValidator::new(self.env);
        for block in &map.blocks {
            match block {
                MemoryBlock::AddressBlock(address_block) => {
                    address_blocks.find_errors_in(errors, address_block, &block_context)
                }
                MemoryBlock::SubspaceMap(subspace) => subspace_maps.find_errors_in(errors, subspace, &block_context),
            }
        }
        find_duplicates(map.blocks.iter().map(MemoryBlock::name), |duplicate| {
            errors.push(format!("Name {duplicate} of memory blocks in {block_context} is not unique."));
        });
        self.find_errors_in_overlap(errors, map, &block_context);
    }
}
