//! Model to XML.
//!
//! Every `write_*` function builds the element for one model entity in a
//! given revision. Unset values are omitted, elements the revision does not
//! define are left out, and repeatable children keep their model order.

mod common;
mod component;
mod definitions;
mod memory;

use ipxact_core::{Document, Revision};
use tracing::debug;

use crate::error::Result;
use crate::profile::{SchemaProfile, STD22};
use crate::tree::XmlDocument;

pub use common::{
    write_access_policies, write_assertions, write_choices, write_memory_array, write_mode_refs,
    write_name_group, write_parameter, write_parameters, write_vendor_extensions,
};
pub use component::{write_address_space, write_component, write_cpu, write_mode};
pub use definitions::{write_abstraction_definition, write_bus_definition};
pub use memory::{
    write_address_block, write_alternate_register, write_field, write_field_access_policy,
    write_memory_map, write_register, write_register_file, write_subspace_map,
};

/// Options for [`DocumentWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Spaces per nesting level; zero writes a compact document.
    pub indent: usize,
    /// Revision used when neither the caller nor the document names one.
    pub fallback_revision: Revision,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            indent: 4,
            fallback_revision: Revision::Std22,
        }
    }
}

/// Writes whole documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentWriter {
    options: WriterOptions,
}

impl DocumentWriter {
    pub fn new(options: WriterOptions) -> Self {
        DocumentWriter { options }
    }

    pub fn options(&self) -> WriterOptions {
        self.options
    }

    /// Profile for `revision`, falling back to the document's own revision
    /// and then to the configured fallback.
    fn profile(&self, document: &Document, revision: Revision) -> &'static SchemaProfile {
        SchemaProfile::for_revision(revision)
            .or_else(|| SchemaProfile::for_revision(document.revision()))
            .or_else(|| SchemaProfile::for_revision(self.options.fallback_revision))
            .unwrap_or(&STD22)
    }

    /// Build the XML tree of `document` in `revision`.
    pub fn write(&self, document: &Document, revision: Revision) -> XmlDocument {
        debug_assert!(document.has_valid_kind(), "VLNV type does not match document kind");
        let profile = self.profile(document, revision);
        debug!(
            kind = %document.kind(),
            revision = %profile.revision,
            vlnv = %document.vlnv(),
            "writing document"
        );

        let root = match document {
            Document::BusDefinition(definition) => write_bus_definition(definition, profile),
            Document::AbstractionDefinition(definition) => write_abstraction_definition(definition, profile),
            Document::Component(component) => write_component(component, profile),
        };
        XmlDocument {
            prolog: document.data().prolog.clone(),
            root,
        }
    }

    /// Write `document` in `revision` to text.
    pub fn write_string(&self, document: &Document, revision: Revision) -> Result<String> {
        self.write(document, revision).to_xml_string(self.options.indent)
    }
}
