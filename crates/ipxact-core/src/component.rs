//! Components.

use serde::{Deserialize, Serialize};

use crate::common::{find_by_name, find_by_name_mut, HasName};
use crate::cpu::Cpu;
use crate::document::{DocumentData, Revision};
use crate::memory::{AddressSpace, MemoryMap};
use crate::mode::Mode;
use crate::node::XmlElement;
use crate::vlnv::{Vlnv, VlnvType};

/// A hardware component.
///
/// Modes, address spaces, memory maps, and processors are modeled. Every
/// other schema child (bus interfaces, model, file sets, ...) is kept as an
/// opaque element and written back at its schema position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    /// Identity, revision, parameters, and the other shared parts.
    pub data: DocumentData,
    /// Operating modes (Std22).
    pub modes: Vec<Mode>,
    pub address_spaces: Vec<AddressSpace>,
    pub memory_maps: Vec<MemoryMap>,
    pub cpus: Vec<Cpu>,
    /// Unmodeled schema children in document order.
    pub other_elements: Vec<XmlElement>,
}

impl Component {
    /// A component with the given identity. The VLNV type tag is set to
    /// [`VlnvType::Component`].
    pub fn new(mut vlnv: Vlnv, revision: Revision) -> Self {
        vlnv.kind = VlnvType::Component;
        Component {
            data: DocumentData::new(vlnv, revision),
            ..Default::default()
        }
    }

    pub fn vlnv(&self) -> &Vlnv {
        &self.data.vlnv
    }

    pub fn revision(&self) -> Revision {
        self.data.revision
    }

    pub fn mode(&self, name: &str) -> Option<&Mode> {
        find_by_name(&self.modes, name)
    }

    /// Names of the declared modes.
    pub fn mode_names(&self) -> Vec<String> {
        self.modes.iter().map(|mode| mode.name().to_string()).collect()
    }

    pub fn address_space(&self, name: &str) -> Option<&AddressSpace> {
        find_by_name(&self.address_spaces, name)
    }

    pub fn memory_map(&self, name: &str) -> Option<&MemoryMap> {
        find_by_name(&self.memory_maps, name)
    }

    pub fn memory_map_mut(&mut self, name: &str) -> Option<&mut MemoryMap> {
        find_by_name_mut(&mut self.memory_maps, name)
    }

    pub fn cpu(&self, name: &str) -> Option<&Cpu> {
        find_by_name(&self.cpus, name)
    }

    /// Unmodeled children with the given local name.
    pub fn other_elements_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.other_elements
            .iter()
            .filter(move |element| element.local_name() == local)
    }
}
