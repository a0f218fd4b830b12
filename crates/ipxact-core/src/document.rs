//! Top-level documents and their shared parts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::abstraction_definition::AbstractionDefinition;
use crate::bus_definition::BusDefinition;
use crate::choice::Choice;
use crate::common::{named_extendable, NameGroup};
use crate::component::Component;
use crate::error::ModelError;
use crate::node::XmlNode;
use crate::parameter::Parameter;
use crate::vlnv::{Vlnv, VlnvType};

/// Schema revision a document conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// IEEE 1685-2014.
    Std14,
    /// IEEE 1685-2022.
    Std22,
    /// Not determined.
    #[default]
    Unknown,
}

impl Revision {
    pub fn as_str(self) -> &'static str {
        match self {
            Revision::Std14 => "std14",
            Revision::Std22 => "std22",
            Revision::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Revision {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "std14" => Ok(Revision::Std14),
            "std22" => Ok(Revision::Std22),
            "unknown" => Ok(Revision::Unknown),
            other => Err(ModelError::UnknownEnumValue {
                kind: "revision",
                value: other.to_string(),
            }),
        }
    }
}

/// A named boolean check over parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assertion {
    /// Name and descriptions.
    pub name_group: NameGroup,
    /// Expression that must hold.
    pub assert: String,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(Assertion);

/// Parts every top-level document carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentData {
    /// Identity; the type tag matches the document kind.
    pub vlnv: Vlnv,
    pub revision: Revision,
    /// Std22 only.
    pub display_name: String,
    /// Std22 only.
    pub short_description: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub choices: Vec<Choice>,
    pub assertions: Vec<Assertion>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
    /// Comments and processing instructions ahead of the root element.
    pub prolog: Vec<XmlNode>,
    /// Attributes of the root element in document order, namespace
    /// declarations included. Empty for documents built in memory.
    pub root_attributes: Vec<(String, String)>,
}

impl DocumentData {
    /// Document data with the given identity and revision.
    pub fn new(vlnv: Vlnv, revision: Revision) -> Self {
        DocumentData {
            vlnv,
            revision,
            ..Default::default()
        }
    }
}

/// A top-level IP-XACT document.
///
/// `clone()` produces an independent deep copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Document {
    BusDefinition(BusDefinition),
    AbstractionDefinition(AbstractionDefinition),
    Component(Component),
}

impl Document {
    /// Document kind as a VLNV type.
    pub fn kind(&self) -> VlnvType {
        match self {
            Document::BusDefinition(_) => VlnvType::BusDefinition,
            Document::AbstractionDefinition(_) => VlnvType::AbstractionDefinition,
            Document::Component(_) => VlnvType::Component,
        }
    }

    pub fn data(&self) -> &DocumentData {
        match self {
            Document::BusDefinition(d) => &d.data,
            Document::AbstractionDefinition(d) => &d.data,
            Document::Component(d) => &d.data,
        }
    }

    pub fn data_mut(&mut self) -> &mut DocumentData {
        match self {
            Document::BusDefinition(d) => &mut d.data,
            Document::AbstractionDefinition(d) => &mut d.data,
            Document::Component(d) => &mut d.data,
        }
    }

    pub fn vlnv(&self) -> &Vlnv {
        &self.data().vlnv
    }

    pub fn revision(&self) -> Revision {
        self.data().revision
    }

    /// Whether the VLNV type tag matches the document kind.
    pub fn has_valid_kind(&self) -> bool {
        self.vlnv().kind == self.kind()
    }

    pub fn as_bus_definition(&self) -> Option<&BusDefinition> {
        match self {
            Document::BusDefinition(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_abstraction_definition(&self) -> Option<&AbstractionDefinition> {
        match self {
            Document::AbstractionDefinition(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Component> {
        match self {
            Document::Component(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_component_mut(&mut self) -> Option<&mut Component> {
        match self {
            Document::Component(d) => Some(d),
            _ => None,
        }
    }
}

impl From<BusDefinition> for Document {
    fn from(d: BusDefinition) -> Self {
        Document::BusDefinition(d)
    }
}

impl From<AbstractionDefinition> for Document {
    fn from(d: AbstractionDefinition) -> Self {
        Document::AbstractionDefinition(d)
    }
}

impl From<Component> for Document {
    fn from(d: Component) -> Self {
        Document::Component(d)
    }
}
