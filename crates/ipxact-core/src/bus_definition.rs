//! Bus definitions.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentData, Revision};
use crate::vlnv::{Vlnv, VlnvType};

/// Type-level description of a bus.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusDefinition {
    /// Identity, revision, parameters, and the other shared parts.
    pub data: DocumentData,
    /// Whether initiators may connect directly to targets.
    pub direct_connection: bool,
    /// Tri-state broadcast flag; `None` when not written.
    pub broadcast: Option<bool>,
    pub is_addressable: bool,
    /// Extended bus definition; an unset VLNV when not extending.
    pub extends: Vlnv,
    /// Initiator limit (expression); empty means unbounded.
    pub max_initiators: String,
    /// Target limit (expression); empty means unbounded.
    pub max_targets: String,
    pub system_group_names: Vec<String>,
}

impl BusDefinition {
    /// A bus definition with the given identity. The VLNV type tag is set to
    /// [`VlnvType::BusDefinition`].
    pub fn new(mut vlnv: Vlnv, revision: Revision) -> Self {
        vlnv.kind = VlnvType::BusDefinition;
        BusDefinition {
            data: DocumentData::new(vlnv, revision),
            ..Default::default()
        }
    }
}
