//! Registers, alternate registers, and register files.

use serde::{Deserialize, Serialize};

use crate::access::{AccessPolicy, AccessType, ModeReference};
use crate::common::{named_extendable, DefinitionRef, HasName, NameGroup};
use crate::field::Field;
use crate::memory_array::MemoryArray;
use crate::node::XmlNode;
use crate::parameter::Parameter;

/// A register: an addressable, ordered container of fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Register {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Register array: Std14 `dim` list or Std22 `array`.
    pub memory_array: Option<MemoryArray>,
    /// Offset from the containing block or register file (expression).
    pub address_offset: String,
    /// External register definition (Std22).
    pub register_definition_ref: Option<DefinitionRef>,
    pub type_identifier: String,
    /// Width in bits (expression).
    pub size: String,
    /// Tri-state volatile flag.
    pub volatile: Option<bool>,
    /// Access (Std14).
    pub access: Option<AccessType>,
    /// Access policies (Std22).
    pub access_policies: Vec<AccessPolicy>,
    /// Fields in stream order.
    pub fields: Vec<Field>,
    pub alternate_registers: Vec<AlternateRegister>,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl Register {
    /// A register with name, offset, and size.
    pub fn new(
        name: impl Into<String>,
        address_offset: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Register {
            name_group: NameGroup::new(name),
            address_offset: address_offset.into(),
            size: size.into(),
            ..Default::default()
        }
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Field by name, mutably.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    /// Whether any of the Std22 register-definition values are set.
    pub fn has_definition_values(&self) -> bool {
        !self.type_identifier.is_empty()
            || !self.size.is_empty()
            || self.volatile.is_some()
            || !self.access_policies.is_empty()
            || !self.fields.is_empty()
    }
}

/// A register variant with its own field layout, selected by mode (Std22)
/// or alternate group (Std14).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlternateRegister {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Alternate group names (Std14).
    pub alternate_groups: Vec<String>,
    /// Mode references (Std22).
    pub mode_refs: Vec<ModeReference>,
    pub type_identifier: String,
    pub volatile: Option<bool>,
    /// Access (Std14).
    pub access: Option<AccessType>,
    /// Access policies (Std22).
    pub access_policies: Vec<AccessPolicy>,
    pub fields: Vec<Field>,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl AlternateRegister {
    pub fn new(name: impl Into<String>) -> Self {
        AlternateRegister {
            name_group: NameGroup::new(name),
            ..Default::default()
        }
    }
}

/// A register file: an addressable, ordered container of registers and
/// nested register files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterFile {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// Register file array.
    pub memory_array: Option<MemoryArray>,
    /// Offset from the containing block or register file (expression).
    pub address_offset: String,
    /// External register file definition (Std22).
    pub register_file_definition_ref: Option<DefinitionRef>,
    pub type_identifier: String,
    /// Size in address units (expression).
    pub range: String,
    /// Access policies (Std22).
    pub access_policies: Vec<AccessPolicy>,
    /// Registers and register files in document order.
    pub register_data: Vec<RegisterData>,
    pub parameters: Vec<Parameter>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

impl RegisterFile {
    /// A register file with name, offset, and range.
    pub fn new(
        name: impl Into<String>,
        address_offset: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        RegisterFile {
            name_group: NameGroup::new(name),
            address_offset: address_offset.into(),
            range: range.into(),
            ..Default::default()
        }
    }

    /// Whether any of the Std22 register-file-definition values are set.
    pub fn has_definition_values(&self) -> bool {
        !self.type_identifier.is_empty()
            || !self.range.is_empty()
            || !self.access_policies.is_empty()
            || !self.register_data.is_empty()
    }
}

named_extendable!(Register, AlternateRegister, RegisterFile);

/// An entry of a register-data list: a register or a register file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterData {
    Register(Register),
    RegisterFile(RegisterFile),
}

impl RegisterData {
    pub fn name(&self) -> &str {
        match self {
            RegisterData::Register(r) => r.name(),
            RegisterData::RegisterFile(rf) => rf.name(),
        }
    }

    pub fn address_offset(&self) -> &str {
        match self {
            RegisterData::Register(r) => &r.address_offset,
            RegisterData::RegisterFile(rf) => &rf.address_offset,
        }
    }

    pub fn is_present(&self) -> &str {
        match self {
            RegisterData::Register(r) => &r.is_present,
            RegisterData::RegisterFile(rf) => &rf.is_present,
        }
    }

    pub fn memory_array(&self) -> Option<&MemoryArray> {
        match self {
            RegisterData::Register(r) => r.memory_array.as_ref(),
            RegisterData::RegisterFile(rf) => rf.memory_array.as_ref(),
        }
    }

    pub fn as_register(&self) -> Option<&Register> {
        match self {
            RegisterData::Register(r) => Some(r),
            RegisterData::RegisterFile(_) => None,
        }
    }

    pub fn as_register_mut(&mut self) -> Option<&mut Register> {
        match self {
            RegisterData::Register(r) => Some(r),
            RegisterData::RegisterFile(_) => None,
        }
    }

    pub fn as_register_file(&self) -> Option<&RegisterFile> {
        match self {
            RegisterData::RegisterFile(rf) => Some(rf),
            RegisterData::Register(_) => None,
        }
    }
}

impl From<Register> for RegisterData {
    fn from(register: Register) -> Self {
        RegisterData::Register(register)
    }
}

impl From<RegisterFile> for RegisterData {
    fn from(register_file: RegisterFile) -> Self {
        RegisterData::RegisterFile(register_file)
    }
}

/// Registers of a register-data list, in order.
pub fn registers(data: &[RegisterData]) -> impl Iterator<Item = &Register> {
    data.iter().filter_map(RegisterData::as_register)
}

/// Register files of a register-data list, in order.
pub fn register_files(data: &[RegisterData]) -> impl Iterator<Item = &RegisterFile> {
    data.iter().filter_map(RegisterData::as_register_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_data_keeps_mixed_order() {
        let data: Vec<RegisterData> = vec![
            Register::new("r0", "0", "32").into(),
            RegisterFile::new("rf", "4", "8").into(),
            Register::new("r1", "12", "32").into(),
        ];
        let names: Vec<&str> = data.iter().map(RegisterData::name).collect();
        assert_eq!(names, ["r0", "rf", "r1"]);
        assert_eq!(registers(&data).count(), 2);
        assert_eq!(register_files(&data).count(), 1);
    }

    #[test]
    fn field_lookup_by_name() {
        let mut register = Register::new("ctrl", "0", "32");
        register.fields.push(Field::new("enable", "0", "1"));
        assert!(register.field("enable").is_some());
        assert!(register.field("missing").is_none());
        register.field_mut("enable").unwrap().bit_width = "2".into();
        assert_eq!(register.fields[0].bit_width, "2");
    }

    #[test]
    fn definition_values_detected() {
        let mut register = Register::default();
        assert!(!register.has_definition_values());
        register.volatile = Some(false);
        assert!(register.has_definition_values());
    }
}
