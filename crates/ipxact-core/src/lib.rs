//! IP-XACT element model.
//!
//! Typed, owned trees for the documents of the IP-XACT standard:
//!
//! - **Identity:** [`Vlnv`] keys and the [`LibraryInterface`] used to resolve them
//! - **Documents:** bus definitions, abstraction definitions, and components,
//!   with parameters, choices, and opaque vendor extensions
//! - **Memory maps:** address blocks, registers, register files, and fields
//! - **References:** counting valueId uses across expressions and resolving
//!   valueIds for the expression evaluator

/// Declare a closed vocabulary of schema keywords.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every value in schema order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Keyword as written in XML.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ModelError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::error::ModelError::UnknownEnumValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub mod access;
pub mod bus_definition;
pub mod abstraction_definition;
pub mod choice;
pub mod common;
pub mod component;
pub mod cpu;
pub mod document;
pub mod error;
pub mod field;
pub mod library;
pub mod memory;
pub mod memory_array;
pub mod mode;
pub mod node;
pub mod parameter;
pub mod references;
pub mod register;
pub mod vlnv;

pub use abstraction_definition::{AbstractionDefinition, PortAbstraction, PortKind};
pub use access::{AccessPolicy, AccessType, ModeReference, ModifiedWrite, ReadAction, TestConstraint, Usage, WriteValueConstraint};
pub use bus_definition::BusDefinition;
pub use choice::{Choice, Enumeration};
pub use common::{DefinitionRef, HasName, HasVendorExtensions, NameGroup};
pub use component::Component;
pub use cpu::{AddressSpaceRef, Cpu};
pub use document::{Assertion, Document, DocumentData, Revision};
pub use error::{ModelError, Result};
pub use field::{EnumeratedUsage, EnumeratedValue, Field, FieldAccessPolicy, FieldReset};
pub use library::LibraryInterface;
pub use memory::{AddressBlock, AddressSpace, MemoryBlock, MemoryMap, SubspaceMap};
pub use memory_array::{Dimension, MemoryArray};
pub use mode::Mode;
pub use node::{XmlElement, XmlNode};
pub use parameter::{Parameter, ParameterType, Resolve};
pub use references::{DocumentParameterFinder, ExpressionVisitor, HasExpressions, ReferenceCounter, ReferenceSite};
pub use register::{AlternateRegister, Register, RegisterData, RegisterFile};
pub use vlnv::{Vlnv, VlnvType};
