//! Name-indexed access to the blocks of a memory map.

use ipxact_core::{
    AccessType, AddressBlock, HasName, MemoryBlock, MemoryMap, ReferenceCounter, SubspaceMap, Usage,
};
use ipxact_validate::{AddressBlockValidator, MemoryMapValidator, SubspaceMapValidator, ValidationEnv, Validator};
use tracing::debug;

use crate::common::{self, ExpressionValue};
use crate::error::{ApiError, Result};
use crate::register::RegisterInterface;

/// Expression-valued attributes of a memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockExpression {
    BaseAddress,
    IsPresent,
    /// Address blocks only.
    Range,
    /// Address blocks only.
    Width,
}

impl BlockExpression {
    fn label(self) -> &'static str {
        match self {
            BlockExpression::BaseAddress => "base address",
            BlockExpression::IsPresent => "isPresent",
            BlockExpression::Range => "range",
            BlockExpression::Width => "width",
        }
    }

    fn get(self, block: &MemoryBlock) -> Option<&str> {
        match (self, block) {
            (BlockExpression::BaseAddress, _) => Some(block.base_address()),
            (BlockExpression::IsPresent, _) => Some(block.is_present()),
            (BlockExpression::Range, MemoryBlock::AddressBlock(address_block)) => Some(&address_block.range),
            (BlockExpression::Width, MemoryBlock::AddressBlock(address_block)) => Some(&address_block.width),
            (BlockExpression::Range | BlockExpression::Width, MemoryBlock::SubspaceMap(_)) => None,
        }
    }

    fn get_mut(self, block: &mut MemoryBlock) -> Option<&mut String> {
        match (self, block) {
            (BlockExpression::BaseAddress, MemoryBlock::AddressBlock(address_block)) => {
                Some(&mut address_block.base_address)
            }
            (BlockExpression::BaseAddress, MemoryBlock::SubspaceMap(subspace)) => Some(&mut subspace.base_address),
            (BlockExpression::IsPresent, MemoryBlock::AddressBlock(address_block)) => {
                Some(&mut address_block.is_present)
            }
            (BlockExpression::IsPresent, MemoryBlock::SubspaceMap(subspace)) => Some(&mut subspace.is_present),
            (BlockExpression::Range, MemoryBlock::AddressBlock(address_block)) => Some(&mut address_block.range),
            (BlockExpression::Width, MemoryBlock::AddressBlock(address_block)) => Some(&mut address_block.width),
            (BlockExpression::Range | BlockExpression::Width, MemoryBlock::SubspaceMap(_)) => None,
        }
    }
}

/// Editor facade over the address blocks and subspace maps of a memory map.
///
/// The evaluator of `env` must not borrow the memory map being edited.
#[derive(Debug)]
pub struct MemoryBlockInterface<'a, 'f> {
    map: &'a mut MemoryMap,
    env: ValidationEnv<'f>,
}

impl<'a, 'f> MemoryBlockInterface<'a, 'f> {
    pub fn new(map: &'a mut MemoryMap, env: ValidationEnv<'f>) -> Self {
        MemoryBlockInterface { map, env }
    }

    fn context(&self) -> String {
        format!("memory map {}", self.map.name_group.name)
    }

    fn address_unit_bits(&self) -> i128 {
        MemoryMapValidator::new(&self.env).address_unit_bits(self.map)
    }

    fn block_mut(&mut self, name: &str) -> Result<&mut MemoryBlock> {
        common::item_mut(self.map.blocks.as_mut_slice(), name)
    }

    fn address_block_mut(&mut self, name: &str) -> Result<&mut AddressBlock> {
        self.block_mut(name)?.as_address_block_mut().ok_or_else(|| ApiError::NotApplicable {
            item: name.to_string(),
            attribute: "register data",
        })
    }

    pub fn count(&self) -> usize {
        self.map.blocks.len()
    }

    pub fn names(&self) -> Vec<String> {
        common::names(self.map.blocks.as_slice())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        common::index_of(self.map.blocks.as_slice(), name)
    }

    pub fn block(&self, name: &str) -> Result<&MemoryBlock> {
        common::item(self.map.blocks.as_slice(), name)
    }

    fn unique_name(&self, base: &str) -> String {
        common::unique_name(base, |candidate| self.index_of(candidate).is_some())
    }

    /// Append an address block named after `base`, placed after the block
    /// with the highest base address. Returns the name used.
    pub fn add_address_block(&mut self, base: &str) -> String {
        let name = self.unique_name(base);
        let base_address = self.map.next_free_address(self.env.evaluator());
        debug!(name = %name, base_address = %base_address, "adding address block");
        self.map.blocks.push(AddressBlock::new(name.clone(), base_address).into());
        name
    }

    /// Append a subspace map named after `base`, placed like an address block.
    pub fn add_subspace_map(&mut self, base: &str) -> String {
        let name = self.unique_name(base);
        let base_address = self.map.next_free_address(self.env.evaluator());
        debug!(name = %name, base_address = %base_address, "adding subspace map");
        self.map.blocks.push(SubspaceMap::new(name.clone(), base_address).into());
        name
    }

    pub fn remove(&mut self, name: &str) -> Result<MemoryBlock> {
        let index = common::position(self.map.blocks.as_slice(), name)?;
        Ok(self.map.blocks.remove(index))
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let taken = self.names();
        common::rename(self.map.blocks.as_mut_slice(), old, new, |candidate| {
            taken.iter().any(|name| name == candidate)
        })
    }

    /// Raw and evaluated form of one attribute.
    pub fn expression(&self, name: &str, attribute: BlockExpression) -> Result<ExpressionValue> {
        let block = self.block(name)?;
        let expression = attribute.get(block).ok_or_else(|| ApiError::NotApplicable {
            item: name.to_string(),
            attribute: attribute.label(),
        })?;
        Ok(ExpressionValue::evaluate(self.env.evaluator(), expression))
    }

    pub fn set_expression(&mut self, name: &str, attribute: BlockExpression, expression: &str) -> Result<()> {
        let block = self.block_mut(name)?;
        let target = attribute.get_mut(block).ok_or_else(|| ApiError::NotApplicable {
            item: name.to_string(),
            attribute: attribute.label(),
        })?;
        *target = expression.to_string();
        Ok(())
    }

    pub fn usage(&self, name: &str) -> Result<Option<Usage>> {
        Ok(self.block(name)?.as_address_block().and_then(|block| block.usage))
    }

    pub fn set_usage(&mut self, name: &str, usage: Option<Usage>) -> Result<()> {
        self.address_block_mut(name)?.usage = usage;
        Ok(())
    }

    pub fn access(&self, name: &str) -> Result<Option<AccessType>> {
        Ok(self.block(name)?.as_address_block().and_then(|block| block.access))
    }

    pub fn set_access(&mut self, name: &str, access: Option<AccessType>) -> Result<()> {
        self.address_block_mut(name)?.access = access;
        Ok(())
    }

    /// Facade over the registers of one address block.
    pub fn registers(&mut self, name: &str) -> Result<RegisterInterface<'_, 'f>> {
        let env = self.env.clone();
        let address_unit_bits = self.address_unit_bits();
        let block = self.address_block_mut(name)?;
        let context = format!("address block {}", block.name());
        Ok(RegisterInterface::new(&mut block.register_data, env)
            .with_address_unit_bits(address_unit_bits)
            .with_context(context))
    }

    /// Validation messages for one block and its contents.
    pub fn errors(&self, name: &str) -> Result<Vec<String>> {
        let block = self.block(name)?;
        let context = self.context();
        let mut errors = Vec::new();
        match block {
            MemoryBlock::AddressBlock(address_block) => AddressBlockValidator::new(&self.env)
                .with_address_unit_bits(self.address_unit_bits())
                .find_errors_in(&mut errors, address_block, &context),
            MemoryBlock::SubspaceMap(subspace) => {
                SubspaceMapValidator::new(&self.env).find_errors_in(&mut errors, subspace, &context)
            }
        }
        Ok(errors)
    }

    pub fn is_valid(&self, name: &str) -> Result<bool> {
        Ok(self.errors(name)?.is_empty())
    }

    /// Whether the whole memory map validates, block overlaps included.
    pub fn all_valid(&self) -> bool {
        MemoryMapValidator::new(&self.env).validate(self.map)
    }

    /// valueIds mentioned by one block and its children.
    pub fn referenced_ids(&self, name: &str) -> Result<Vec<String>> {
        Ok(common::ids_referenced_by(self.block(name)?))
    }

    /// Mentions of `id` in one block and its children.
    pub fn reference_count(&self, name: &str, id: &str) -> Result<usize> {
        Ok(ReferenceCounter::count(self.block(name)?, id))
    }

    /// Mentions of `id` across all blocks.
    pub fn total_references(&self, id: &str) -> usize {
        common::count_in_all(self.map.blocks.as_slice(), id)
    }
}
