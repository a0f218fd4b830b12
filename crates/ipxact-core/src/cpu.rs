//! Processors declared by a component.

use serde::{Deserialize, Serialize};

use crate::common::{named_extendable, NameGroup};
use crate::node::{XmlElement, XmlNode};
use crate::parameter::Parameter;

/// Reference from a CPU to an address space (Std14).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressSpaceRef {
    /// Name of the referenced address space.
    pub reference: String,
    /// Presence expression.
    pub is_present: String,
}

impl AddressSpaceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        AddressSpaceRef {
            reference: reference.into(),
            is_present: String::new(),
        }
    }
}

/// A processor.
///
/// Std14 processors see memory through address spaces; Std22 processors
/// carry their own range and width and reference a memory map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cpu {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Address space references (Std14).
    pub address_space_refs: Vec<AddressSpaceRef>,
    /// Addressable range (Std22, expression).
    pub range: String,
    /// Width in bits (Std22, expression).
    pub width: String,
    /// Bits per address unit (Std22, expression).
    pub address_unit_bits: String,
    /// `executableImage` elements (Std22), kept opaque.
    pub executable_images: Vec<XmlElement>,
    /// Referenced memory map (Std22).
    pub memory_map_ref: String,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(Cpu);

impl Cpu {
    pub fn new(name: impl Into<String>) -> Self {
        Cpu {
            name_group: NameGroup::new(name),
            ..Default::default()
        }
    }
}
