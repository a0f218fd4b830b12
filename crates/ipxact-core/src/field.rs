//! Register fields.

use serde::{Deserialize, Serialize};

use crate::access::{
    AccessType, ModeReference, ModifiedWrite, ReadAction, TestConstraint, WriteValueConstraint,
};
use crate::common::{named_extendable, DefinitionRef, NameGroup};
use crate::memory_array::MemoryArray;
use crate::node::{XmlElement, XmlNode};
use crate::parameter::Parameter;

string_enum! {
    /// Direction in which an enumerated value applies.
    EnumeratedUsage, "enumerated value usage" {
        Read => "read",
        Write => "write",
        ReadWrite => "read-write",
    }
}

/// Named value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumeratedValue {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Value expression.
    pub value: String,
    /// Access direction the value applies to.
    pub usage: Option<EnumeratedUsage>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl EnumeratedValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnumeratedValue {
            name_group: NameGroup::new(name),
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Reset value of a field for one reset type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldReset {
    /// Name of the component reset type; empty for the hard reset.
    pub reset_type_ref: String,
    /// Reset value expression.
    pub value: String,
    /// Mask expression selecting the bits the reset affects.
    pub mask: String,
}

impl FieldReset {
    pub fn new(value: impl Into<String>) -> Self {
        FieldReset {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// Std22 field access policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldAccessPolicy {
    /// Modes in which this policy applies.
    pub mode_refs: Vec<ModeReference>,
    /// External policy definition.
    pub definition_ref: Option<DefinitionRef>,
    pub access: Option<AccessType>,
    pub modified_write_value: Option<ModifiedWrite>,
    /// `modify` attribute of `modifiedWriteValue`.
    pub modified_write_modify: String,
    pub write_value_constraint: Option<WriteValueConstraint>,
    pub read_action: Option<ReadAction>,
    /// `modify` attribute of `readAction`.
    pub read_action_modify: String,
    /// Value returned on read (expression).
    pub read_response: String,
    /// `broadcasts` element, kept opaque.
    pub broadcasts: Option<XmlElement>,
    /// `accessRestrictions` element, kept opaque.
    pub access_restrictions: Option<XmlElement>,
    pub testable: Option<bool>,
    pub test_constraint: Option<TestConstraint>,
    /// Reserved expression, evaluates to 0 or 1.
    pub reserved: String,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

/// A bit range inside a register.
///
/// In Std14 documents the access properties live directly on the field;
/// in Std22 documents they live in `field_access_policies`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// `fieldID` attribute.
    pub id: String,
    /// Presence expression (Std14), evaluates to 0 or 1.
    pub is_present: String,
    /// Field array (Std22).
    pub memory_array: Option<MemoryArray>,
    /// Offset of the lowest bit in the register (expression).
    pub bit_offset: String,
    /// `aliasOf` element (Std22), kept opaque.
    pub alias_of: Option<XmlElement>,
    /// Reset values.
    pub resets: Vec<FieldReset>,
    /// Fields sharing a type identifier share their definition.
    pub type_identifier: String,
    /// Width in bits (expression).
    pub bit_width: String,
    /// External field definition (Std22).
    pub field_definition_ref: Option<DefinitionRef>,
    /// Tri-state volatile flag.
    pub volatile: Option<bool>,
    pub access: Option<AccessType>,
    pub enumerated_values: Vec<EnumeratedValue>,
    pub modified_write_value: Option<ModifiedWrite>,
    /// `modify` attribute of `modifiedWriteValue`.
    pub modified_write_modify: String,
    pub write_value_constraint: Option<WriteValueConstraint>,
    pub read_action: Option<ReadAction>,
    /// `modify` attribute of `readAction`.
    pub read_action_modify: String,
    pub testable: Option<bool>,
    pub test_constraint: Option<TestConstraint>,
    /// Reserved expression (Std14), evaluates to 0 or 1.
    pub reserved: String,
    /// Access policies (Std22).
    pub field_access_policies: Vec<FieldAccessPolicy>,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(Field, EnumeratedValue);

impl Field {
    /// A field with name, offset, and width.
    pub fn new(
        name: impl Into<String>,
        bit_offset: impl Into<String>,
        bit_width: impl Into<String>,
    ) -> Self {
        Field {
            name_group: NameGroup::new(name),
            bit_offset: bit_offset.into(),
            bit_width: bit_width.into(),
            ..Default::default()
        }
    }

    /// Whether any access policy restricts itself to modes.
    pub fn has_mode_dependent_access(&self) -> bool {
        self.field_access_policies
            .iter()
            .any(|policy| !policy.mode_refs.is_empty())
    }

    /// Effective access: the field's own access, or that of its only
    /// access policy.
    pub fn effective_access(&self) -> Option<AccessType> {
        self.access.or_else(|| match self.field_access_policies.as_slice() {
            [policy] => policy.access,
            _ => None,
        })
    }
}
