//! Building blocks shared by most model entities.

use serde::{Deserialize, Serialize};

use crate::node::XmlNode;

/// Name, display name, and descriptions carried by named entities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NameGroup {
    /// Identifier, unique among siblings of the same kind.
    pub name: String,
    /// Optional human-readable name.
    pub display_name: String,
    /// One-line description (Std22).
    pub short_description: String,
    /// Free-form description.
    pub description: String,
}

impl NameGroup {
    /// A name group with only the name set.
    pub fn new(name: impl Into<String>) -> Self {
        NameGroup {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Entities identified by a [`NameGroup`].
pub trait HasName {
    fn name_group(&self) -> &NameGroup;

    fn name_group_mut(&mut self) -> &mut NameGroup;

    fn name(&self) -> &str {
        &self.name_group().name
    }

    fn set_name(&mut self, name: &str) {
        self.name_group_mut().name = name.to_string();
    }
}

/// Entities carrying an opaque vendor extension list.
pub trait HasVendorExtensions {
    fn vendor_extensions(&self) -> &[XmlNode];

    fn vendor_extensions_mut(&mut self) -> &mut Vec<XmlNode>;
}

/// Reference to a type definition in an external typeDefinitions document
/// (Std22 `fieldDefinitionRef`, `registerDefinitionRef`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefinitionRef {
    /// Name of the referenced typeDefinitions.
    pub type_definitions: String,
    /// Name of the referenced definition.
    pub name: String,
}

/// Implement [`HasName`] and [`HasVendorExtensions`] for structs with
/// `name_group` and `vendor_extensions` fields.
macro_rules! named_extendable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::common::HasName for $ty {
                fn name_group(&self) -> &$crate::common::NameGroup {
                    &self.name_group
                }

                fn name_group_mut(&mut self) -> &mut $crate::common::NameGroup {
                    &mut self.name_group
                }
            }

            impl $crate::common::HasVendorExtensions for $ty {
                fn vendor_extensions(&self) -> &[$crate::node::XmlNode] {
                    &self.vendor_extensions
                }

                fn vendor_extensions_mut(&mut self) -> &mut Vec<$crate::node::XmlNode> {
                    &mut self.vendor_extensions
                }
            }
        )+
    };
}

pub(crate) use named_extendable;

/// First item with the given name.
pub fn find_by_name<'a, T: HasName>(items: &'a [T], name: &str) -> Option<&'a T> {
    items.iter().find(|item| item.name() == name)
}

/// First item with the given name, mutably.
pub fn find_by_name_mut<'a, T: HasName>(items: &'a mut [T], name: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.name() == name)
}
