//! Access types, access policies, and mode references.

use serde::{Deserialize, Serialize};

use crate::node::XmlNode;

string_enum! {
    /// Software access permitted on a register or field.
    AccessType, "access" {
        ReadWrite => "read-write",
        ReadOnly => "read-only",
        WriteOnly => "write-only",
        ReadWriteOnce => "read-writeOnce",
        WriteOnce => "writeOnce",
        /// Std22 only.
        NoAccess => "no-access",
    }
}

impl AccessType {
    /// Whether software can read the item.
    pub fn is_readable(self) -> bool {
        matches!(
            self,
            AccessType::ReadWrite | AccessType::ReadOnly | AccessType::ReadWriteOnce
        )
    }

    /// Whether software can write the item.
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            AccessType::ReadWrite
                | AccessType::WriteOnly
                | AccessType::ReadWriteOnce
                | AccessType::WriteOnce
        )
    }
}

string_enum! {
    /// Side effect of a software write on a field.
    ModifiedWrite, "modified write value" {
        OneToClear => "oneToClear",
        OneToSet => "oneToSet",
        OneToToggle => "oneToToggle",
        ZeroToClear => "zeroToClear",
        ZeroToSet => "zeroToSet",
        ZeroToToggle => "zeroToToggle",
        Clear => "clear",
        Set => "set",
        Modify => "modify",
    }
}

string_enum! {
    /// Side effect of a software read on a field.
    ReadAction, "read action" {
        Clear => "clear",
        Set => "set",
        Modify => "modify",
    }
}

string_enum! {
    /// Constraint on automated register testing.
    TestConstraint, "test constraint" {
        Unconstrained => "unConstrained",
        Restore => "restore",
        WriteAsRead => "writeAsRead",
        ReadOnly => "readOnly",
    }
}

string_enum! {
    /// Intended use of an address block.
    Usage, "usage" {
        Memory => "memory",
        Register => "register",
        Reserved => "reserved",
    }
}

/// Reference to a component mode, with its priority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeReference {
    /// Name of the referenced mode.
    pub reference: String,
    /// Priority, unique among the references of one owner.
    pub priority: String,
}

impl ModeReference {
    pub fn new(reference: impl Into<String>, priority: impl Into<String>) -> Self {
        ModeReference {
            reference: reference.into(),
            priority: priority.into(),
        }
    }
}

/// Std22 access policy of a register, register file, or address block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Modes in which this policy applies. Empty means "always".
    pub mode_refs: Vec<ModeReference>,
    /// Access granted under this policy.
    pub access: Option<AccessType>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

/// Constraint on the values software may write to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteValueConstraint {
    /// Only the value last read may be written.
    WriteAsRead,
    /// Only enumerated values may be written.
    UseEnumeratedValues,
    /// Values between two expressions, inclusive.
    MinMax {
        /// Lowest legal value.
        minimum: String,
        /// Highest legal value.
        maximum: String,
    },
}

/// Mode references shared by every item of a policy list.
pub fn all_mode_refs(policies: &[AccessPolicy]) -> impl Iterator<Item = &ModeReference> {
    policies.iter().flat_map(|policy| policy.mode_refs.iter())
}
