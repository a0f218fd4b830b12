//! Abstraction definitions: the logical ports of a bus.

use serde::{Deserialize, Serialize};

use crate::common::{named_extendable, NameGroup};
use crate::document::{DocumentData, Revision};
use crate::node::{XmlElement, XmlNode};
use crate::vlnv::{Vlnv, VlnvType};

/// Signalling style of a logical port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Wire,
    Transactional,
}

/// One logical port.
///
/// The `wire` or `transactional` body is carried as an opaque element;
/// the name group's `name` holds the `logicalName`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortAbstraction {
    /// Logical name and descriptions.
    pub name_group: NameGroup,
    /// Presence expression (Std14).
    pub is_present: String,
    /// `match` element (Std22), kept opaque.
    pub match_element: Option<XmlElement>,
    /// `wire` or `transactional` element.
    pub body: Option<XmlElement>,
    /// `packets` element (Std22), kept opaque.
    pub packets: Option<XmlElement>,
    /// Opaque vendor extensions.
    pub vendor_extensions: Vec<XmlNode>,
}

named_extendable!(PortAbstraction);

impl PortAbstraction {
    /// A wire port with an empty body.
    pub fn wire(logical_name: impl Into<String>) -> Self {
        PortAbstraction {
            name_group: NameGroup::new(logical_name),
            body: Some(XmlElement::new("ipxact:wire")),
            ..Default::default()
        }
    }

    /// Logical name.
    pub fn logical_name(&self) -> &str {
        &self.name_group.name
    }

    /// Port kind derived from the body element.
    pub fn kind(&self) -> Option<PortKind> {
        match self.body.as_ref().map(XmlElement::local_name) {
            Some("wire") => Some(PortKind::Wire),
            Some("transactional") => Some(PortKind::Transactional),
            _ => None,
        }
    }
}

/// Abstraction of a bus definition into logical ports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbstractionDefinition {
    /// Identity, revision, parameters, and the other shared parts.
    pub data: DocumentData,
    /// The bus definition this abstraction refines.
    pub bus_type: Vlnv,
    /// Extended abstraction definition; an unset VLNV when not extending.
    pub extends: Vlnv,
    /// Logical ports in document order.
    pub logical_ports: Vec<PortAbstraction>,
}

impl AbstractionDefinition {
    /// An abstraction definition with the given identity. The VLNV type tag
    /// is set to [`VlnvType::AbstractionDefinition`].
    pub fn new(mut vlnv: Vlnv, revision: Revision) -> Self {
        vlnv.kind = VlnvType::AbstractionDefinition;
        AbstractionDefinition {
            data: DocumentData::new(vlnv, revision),
            ..Default::default()
        }
    }

    /// Logical port by name.
    pub fn port(&self, logical_name: &str) -> Option<&PortAbstraction> {
        self.logical_ports
            .iter()
            .find(|port| port.logical_name() == logical_name)
    }
}
