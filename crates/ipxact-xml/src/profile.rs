//! Per-revision schema differences.
//!
//! Everything the reader and writer need to know about a revision lives in
//! one [`SchemaProfile`] value, selected by an exhaustive match on
//! [`Revision`].

use ipxact_core::Revision;

/// Namespace of tool-specific vendor extensions.
pub const KACTUS2_NAMESPACE: &str = "http://kactus2.cs.tut.fi";

/// XML Schema instance namespace.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Element name prefix used for IP-XACT elements.
pub const PREFIX: &str = "ipxact";

/// Schema facts for one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaProfile {
    pub revision: Revision,
    /// IP-XACT namespace URI.
    pub namespace: &'static str,
    /// Value of `xsi:schemaLocation`.
    pub schema_location: &'static str,
    /// Bus definition element holding the initiator limit.
    pub max_initiators: &'static str,
    /// Bus definition element holding the target limit.
    pub max_targets: &'static str,
    /// Subspace map attribute naming the initiator interface.
    pub subspace_initiator_ref: &'static str,
    /// Elements carry `isPresent`.
    pub has_is_present: bool,
    /// Name groups carry `shortDescription`.
    pub has_short_description: bool,
    /// Document name group is followed by display name and descriptions.
    pub has_document_name_group: bool,
    /// Components carry `modes`.
    pub has_modes: bool,
    /// Registers, register files, and blocks carry `accessPolicies`;
    /// fields carry `fieldAccessPolicies`.
    pub has_access_policies: bool,
    /// Bus and abstraction definitions carry `choices`.
    pub has_definition_choices: bool,
    /// Bus definitions carry `broadcast`.
    pub has_broadcast: bool,
    /// Items may reference external type definitions.
    pub has_definition_refs: bool,
    /// Items carry `array` with a stride instead of bare `dim` elements.
    pub has_memory_arrays: bool,
    /// Processors carry range, width, and a memory map reference instead of
    /// address space references.
    pub has_standalone_cpus: bool,
    /// Component children in schema order.
    pub component_order: &'static [&'static str],
}

/// IEEE 1685-2014.
pub const STD14: SchemaProfile = SchemaProfile {
    revision: Revision::Std14,
    namespace: "http://www.accellera.org/XMLSchema/IPXACT/1685-2014",
    schema_location: "http://www.accellera.org/XMLSchema/IPXACT/1685-2014 \
                      http://www.accellera.org/XMLSchema/IPXACT/1685-2014/index.xsd",
    max_initiators: "maxMasters",
    max_targets: "maxSlaves",
    subspace_initiator_ref: "masterRef",
    has_is_present: true,
    has_short_description: false,
    has_document_name_group: false,
    has_modes: false,
    has_access_policies: false,
    has_definition_choices: false,
    has_broadcast: false,
    has_definition_refs: false,
    has_memory_arrays: false,
    has_standalone_cpus: false,
    component_order: &[
        "vendor",
        "library",
        "name",
        "version",
        "busInterfaces",
        "indirectInterfaces",
        "channels",
        "remapStates",
        "addressSpaces",
        "memoryMaps",
        "model",
        "componentGenerators",
        "choices",
        "fileSets",
        "whiteboxElements",
        "cpus",
        "otherClockDrivers",
        "resetTypes",
        "description",
        "parameters",
        "assertions",
        "vendorExtensions",
    ],
};

/// IEEE 1685-2022.
pub const STD22: SchemaProfile = SchemaProfile {
    revision: Revision::Std22,
    namespace: "http://www.accellera.org/XMLSchema/IPXACT/1685-2022",
    schema_location: "http://www.accellera.org/XMLSchema/IPXACT/1685-2022 \
                      http://www.accellera.org/XMLSchema/IPXACT/1685-2022/index.xsd",
    max_initiators: "maxInitiators",
    max_targets: "maxTargets",
    subspace_initiator_ref: "initiatorRef",
    has_is_present: false,
    has_short_description: true,
    has_document_name_group: true,
    has_modes: true,
    has_access_policies: true,
    has_definition_choices: true,
    has_broadcast: true,
    has_definition_refs: true,
    has_memory_arrays: true,
    has_standalone_cpus: true,
    component_order: &[
        "vendor",
        "library",
        "name",
        "version",
        "displayName",
        "shortDescription",
        "description",
        "typeDefinitions",
        "powerDomains",
        "busInterfaces",
        "indirectInterfaces",
        "channels",
        "modes",
        "addressSpaces",
        "memoryMaps",
        "model",
        "componentGenerators",
        "choices",
        "fileSets",
        "cpus",
        "otherClockDrivers",
        "resetTypes",
        "parameters",
        "assertions",
        "vendorExtensions",
    ],
};

impl SchemaProfile {
    /// Profile of a known revision.
    pub fn for_revision(revision: Revision) -> Option<&'static SchemaProfile> {
        match revision {
            Revision::Std14 => Some(&STD14),
            Revision::Std22 => Some(&STD22),
            Revision::Unknown => None,
        }
    }

    /// Revision whose namespace URI is `namespace`.
    pub fn revision_for_namespace(namespace: &str) -> Revision {
        let namespace = namespace.trim_end_matches('/');
        [&STD14, &STD22]
            .into_iter()
            .find(|profile| profile.namespace == namespace)
            .map_or(Revision::Unknown, |profile| profile.revision)
    }

    /// Qualified IP-XACT element name.
    pub fn tag(local: &str) -> String {
        format!("{PREFIX}:{local}")
    }
}
