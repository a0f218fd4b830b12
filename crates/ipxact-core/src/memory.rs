//! Memory maps, their blocks, and address spaces.

use ipxact_expr::ExpressionEvaluator;
use serde::{Deserialize, Serialize};

use crate::access::{AccessPolicy, AccessType, Usage};
use crate::common::{named_extendable, DefinitionRef, HasName, NameGroup};
use crate::memory_array::MemoryArray;
use crate::node::{XmlElement, XmlNode};
use crate::parameter::Parameter;
use crate::register::RegisterData;

/// A contiguous address range holding registers or memory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressBlock {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Block array (Std22).
    pub memory_array: Option<MemoryArray>,
    /// Start address in address units (expression).
    pub base_address: String,
    /// External definition (Std22).
    pub address_block_definition_ref: Option<DefinitionRef>,
    pub type_identifier: String,
    /// Size in address units (expression).
    pub range: String,
    /// Width in bits (expression).
    pub width: String,
    pub usage: Option<Usage>,
    pub volatile: Option<bool>,
    /// Access (Std14).
    pub access: Option<AccessType>,
    /// Access policies (Std22).
    pub access_policies: Vec<AccessPolicy>,
    pub parameters: Vec<Parameter>,
    /// Registers and register files in document order.
    pub register_data: Vec<RegisterData>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl AddressBlock {
    /// A block with the given name and base address, a 32-bit width, and a
    /// range of four address units.
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        AddressBlock {
            name_group: NameGroup::new(name),
            base_address: base_address.into(),
            range: "4".to_string(),
            width: "32".to_string(),
            ..Default::default()
        }
    }

    /// Whether any of the Std22 block-definition values are set.
    pub fn has_definition_values(&self) -> bool {
        !self.type_identifier.is_empty()
            || !self.range.is_empty()
            || !self.width.is_empty()
            || self.usage.is_some()
            || self.volatile.is_some()
            || !self.access_policies.is_empty()
            || !self.register_data.is_empty()
    }
}

/// A window into the address space of a bus initiator interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubspaceMap {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Referenced initiator bus interface (`masterRef` in Std14).
    pub initiator_ref: String,
    /// Referenced segment of the initiator's address space.
    pub segment_ref: String,
    /// Start address in address units (expression).
    pub base_address: String,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl SubspaceMap {
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        SubspaceMap {
            name_group: NameGroup::new(name),
            base_address: base_address.into(),
            ..Default::default()
        }
    }
}

named_extendable!(AddressBlock, SubspaceMap);

/// An entry of a memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryBlock {
    AddressBlock(AddressBlock),
    SubspaceMap(SubspaceMap),
}

impl MemoryBlock {
    pub fn name(&self) -> &str {
        match self {
            MemoryBlock::AddressBlock(block) => block.name(),
            MemoryBlock::SubspaceMap(map) => map.name(),
        }
    }

    pub fn base_address(&self) -> &str {
        match self {
            MemoryBlock::AddressBlock(block) => &block.base_address,
            MemoryBlock::SubspaceMap(map) => &map.base_address,
        }
    }

    pub fn set_base_address(&mut self, base_address: impl Into<String>) {
        let base_address = base_address.into();
        match self {
            MemoryBlock::AddressBlock(block) => block.base_address = base_address,
            MemoryBlock::SubspaceMap(map) => map.base_address = base_address,
        }
    }

    pub fn is_present(&self) -> &str {
        match self {
            MemoryBlock::AddressBlock(block) => &block.is_present,
            MemoryBlock::SubspaceMap(map) => &map.is_present,
        }
    }

    pub fn set_is_present(&mut self, is_present: impl Into<String>) {
        let is_present = is_present.into();
        match self {
            MemoryBlock::AddressBlock(block) => block.is_present = is_present,
            MemoryBlock::SubspaceMap(map) => map.is_present = is_present,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            MemoryBlock::AddressBlock(block) => &block.parameters,
            MemoryBlock::SubspaceMap(map) => &map.parameters,
        }
    }

    /// Range expression; subspace maps have none.
    pub fn range(&self) -> Option<&str> {
        match self {
            MemoryBlock::AddressBlock(block) => Some(&block.range),
            MemoryBlock::SubspaceMap(_) => None,
        }
    }

    pub fn as_address_block(&self) -> Option<&AddressBlock> {
        match self {
            MemoryBlock::AddressBlock(block) => Some(block),
            MemoryBlock::SubspaceMap(_) => None,
        }
    }

    pub fn as_address_block_mut(&mut self) -> Option<&mut AddressBlock> {
        match self {
            MemoryBlock::AddressBlock(block) => Some(block),
            MemoryBlock::SubspaceMap(_) => None,
        }
    }

    pub fn as_subspace_map(&self) -> Option<&SubspaceMap> {
        match self {
            MemoryBlock::SubspaceMap(map) => Some(map),
            MemoryBlock::AddressBlock(_) => None,
        }
    }
}

impl HasName for MemoryBlock {
    fn name_group(&self) -> &NameGroup {
        match self {
            MemoryBlock::AddressBlock(block) => &block.name_group,
            MemoryBlock::SubspaceMap(map) => &map.name_group,
        }
    }

    fn name_group_mut(&mut self) -> &mut NameGroup {
        match self {
            MemoryBlock::AddressBlock(block) => &mut block.name_group,
            MemoryBlock::SubspaceMap(map) => &mut map.name_group,
        }
    }
}

impl From<AddressBlock> for MemoryBlock {
    fn from(block: AddressBlock) -> Self {
        MemoryBlock::AddressBlock(block)
    }
}

impl From<SubspaceMap> for MemoryBlock {
    fn from(map: SubspaceMap) -> Self {
        MemoryBlock::SubspaceMap(map)
    }
}

/// A target-side memory map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryMap {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Address blocks and subspace maps in document order.
    pub blocks: Vec<MemoryBlock>,
    /// `memoryRemap` elements, kept opaque.
    pub memory_remaps: Vec<XmlElement>,
    /// Bits per address unit (expression).
    pub address_unit_bits: String,
    /// `shared` keyword (`yes`, `no`, `undefined`).
    pub shared: String,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(MemoryMap);

impl MemoryMap {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryMap {
            name_group: NameGroup::new(name),
            ..Default::default()
        }
    }

    /// Block by name.
    pub fn block(&self, name: &str) -> Option<&MemoryBlock> {
        self.blocks.iter().find(|block| block.name() == name)
    }

    /// Blocks ordered by evaluated base address. Blocks whose base address
    /// does not evaluate sort last, in document order.
    pub fn blocks_by_base_address(&self, evaluator: &ExpressionEvaluator<'_>) -> Vec<&MemoryBlock> {
        let mut ordered: Vec<(Option<i128>, &MemoryBlock)> = self
            .blocks
            .iter()
            .map(|block| (evaluator.evaluate_int(block.base_address()).ok(), block))
            .collect();
        ordered.sort_by_key(|(base, _)| (base.is_none(), base.unwrap_or_default()));
        ordered.into_iter().map(|(_, block)| block).collect()
    }

    /// Default base address for a new block: the end of the block with
    /// the highest base address, as a `'h` literal.
    ///
    /// A subspace map contributes a range of zero.
    pub fn next_free_address(&self, evaluator: &ExpressionEvaluator<'_>) -> String {
        let mut last_base: i128 = 0;
        let mut last_range: i128 = 0;
        let count = self.blocks.len();
        for (index, block) in self.blocks.iter().enumerate() {
            let base = evaluator.evaluate_int(block.base_address()).unwrap_or(0);
            if base > last_base || (index + 1 == count && last_base == 0) {
                last_base = base;
                last_range = block
                    .range()
                    .and_then(|range| evaluator.evaluate_int(range).ok())
                    .unwrap_or(0);
            }
        }
        format!("'h{:X}", last_base.saturating_add(last_range).max(0))
    }
}

/// An initiator-side address space.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressSpace {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Size in address units (expression).
    pub range: String,
    /// Width in bits (expression).
    pub width: String,
    /// `segments` element, kept opaque.
    pub segments: Option<XmlElement>,
    /// Bits per address unit (expression).
    pub address_unit_bits: String,
    /// `executableImage` elements, kept opaque.
    pub executable_images: Vec<XmlElement>,
    /// `localMemoryMap` element, kept opaque.
    pub local_memory_map: Option<XmlElement>,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(AddressSpace);

impl AddressSpace {
    pub fn new(name: impl Into<String>, range: impl Into<String>, width: impl Into<String>) -> Self {
        AddressSpace {
            name_group: NameGroup::new(name),
            range: range.into(),
            width: width.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use ipxact_expr::NullFinder;

    use super::*;

    fn map_with(blocks: Vec<MemoryBlock>) -> MemoryMap {
        MemoryMap {
            blocks,
            ..MemoryMap::new("map")
        }
    }

    #[test]
    fn next_free_address_follows_highest_block() {
        let finder = NullFinder;
        let evaluator = ExpressionEvaluator::new(&finder);
        let mut high = AddressBlock::new("high", "'h100");
        high.range = "'h10".into();
        let map = map_with(vec![high.into(), AddressBlock::new("low", "0").into()]);
        assert_eq!(map.next_free_address(&evaluator), "'h110");
    }

    #[test]
    fn next_free_address_of_empty_map_is_zero() {
        let finder = NullFinder;
        let evaluator = ExpressionEvaluator::new(&finder);
        assert_eq!(MemoryMap::new("m").next_free_address(&evaluator), "'h0");
    }

    #[test]
    fn subspace_map_contributes_no_range() {
        let finder = NullFinder;
        let evaluator = ExpressionEvaluator::new(&finder);
        let map = map_with(vec![
            AddressBlock::new("block", "0").into(),
            SubspaceMap::new("sub", "'h20").into(),
        ]);
        assert_eq!(map.next_free_address(&evaluator), "'h20");
    }

    #[test]
    fn blocks_sort_by_evaluated_base() {
        let finder = NullFinder;
        let evaluator = ExpressionEvaluator::new(&finder);
        let map = map_with(vec![
            AddressBlock::new("c", "unknown_id").into(),
            AddressBlock::new("b", "'h20").into(),
            AddressBlock::new("a", "4 * 2").into(),
        ]);
        let names: Vec<&str> = map
            .blocks_by_base_address(&evaluator)
            .into_iter()
            .map(MemoryBlock::name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
