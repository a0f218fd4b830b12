//! Parameters and their value identifiers.

use serde::{Deserialize, Serialize};

use crate::common::{named_extendable, NameGroup};
use crate::node::XmlNode;

string_enum! {
    /// SystemVerilog type of a parameter value.
    ParameterType, "parameter type" {
        Bit => "bit",
        Byte => "byte",
        Shortint => "shortint",
        Int => "int",
        Longint => "longint",
        Shortreal => "shortreal",
        Real => "real",
        String => "string",
    }
}

impl ParameterType {
    /// Bit width of the integer types, `None` for reals and strings.
    pub fn integer_width(self) -> Option<u32> {
        match self {
            ParameterType::Byte => Some(8),
            ParameterType::Shortint => Some(16),
            ParameterType::Int => Some(32),
            ParameterType::Longint => Some(64),
            ParameterType::Bit | ParameterType::Shortreal | ParameterType::Real | ParameterType::String => None,
        }
    }
}

string_enum! {
    /// Who decides a parameter's value.
    Resolve, "resolve" {
        Immediate => "immediate",
        User => "user",
        Generated => "generated",
    }
}

/// A named, typed value that other expressions can reference by its valueId.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Stable reference key (`parameterId`) used inside expressions.
    pub value_id: String,
    /// Type keyword as written; see [`Parameter::parameter_type`].
    pub parameter_type: String,
    /// Value expression.
    pub value: String,
    /// Resolve keyword as written; see [`Parameter::resolve_kind`].
    pub resolve: String,
    /// Name of the choice constraining the value.
    pub choice_ref: String,
    /// Lowest legal value.
    pub minimum: String,
    /// Highest legal value.
    pub maximum: String,
    /// Left bound of the vector range.
    pub vector_left: String,
    /// Right bound of the vector range.
    pub vector_right: String,
    /// Left bound of the array range.
    pub array_left: String,
    /// Right bound of the array range.
    pub array_right: String,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(Parameter);

impl Parameter {
    /// A parameter with a name, a value, and a fresh valueId.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter {
            name_group: NameGroup::new(name),
            value_id: Parameter::new_value_id(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Generate a fresh valueId, `uuid_` followed by a random UUID with
    /// underscores for separators so that the id lexes as one symbol.
    pub fn new_value_id() -> String {
        format!("uuid_{}", uuid::Uuid::new_v4().to_string().replace('-', "_"))
    }

    /// Parsed type keyword.
    pub fn parameter_type(&self) -> Option<ParameterType> {
        self.parameter_type.parse().ok()
    }

    /// Parsed resolve keyword. An empty resolve means immediate.
    pub fn resolve_kind(&self) -> Option<Resolve> {
        if self.resolve.is_empty() {
            Some(Resolve::Immediate)
        } else {
            self.resolve.parse().ok()
        }
    }

    /// Whether a vector range is declared.
    pub fn has_vector(&self) -> bool {
        !self.vector_left.is_empty() || !self.vector_right.is_empty()
    }

    /// Whether an array range is declared.
    pub fn has_array(&self) -> bool {
        !self.array_left.is_empty() || !self.array_right.is_empty()
    }
}
