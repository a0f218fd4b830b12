//! XML to model.
//!
//! The reader is permissive: problems with single elements become
//! [`ParseIssue`]s and reading continues with their siblings. Elements that
//! do not exist in the document's revision are skipped.

mod common;
mod component;
mod definitions;
mod memory;

use ipxact_core::{Document, Revision, VlnvType, XmlElement};
use tracing::{debug, warn};

use crate::error::{ParseError, ParseIssue};
use crate::profile::SchemaProfile;
use crate::tree::XmlDocument;

pub use common::{
    read_access_policies, read_assertions, read_choices, read_memory_array, read_mode_refs,
    read_name_group, read_parameter, read_parameters, read_vendor_extensions,
};
pub use component::{read_address_space, read_component, read_cpu, read_mode};
pub use definitions::{read_abstraction_definition, read_bus_definition};
pub use memory::{
    read_address_block, read_alternate_register, read_field, read_field_access_policy,
    read_memory_map, read_register, read_register_file, read_subspace_map,
};

/// A value read from XML together with the non-fatal issues found.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub issues: Vec<ParseIssue>,
}

impl<T> Parsed<T> {
    /// Whether reading found no issues.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// State shared by the per-entity read functions.
#[derive(Debug)]
pub struct ReadContext {
    profile: &'static SchemaProfile,
    path: Vec<String>,
    issues: Vec<ParseIssue>,
}

impl ReadContext {
    pub fn new(profile: &'static SchemaProfile) -> Self {
        ReadContext {
            profile,
            path: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn profile(&self) -> &'static SchemaProfile {
        self.profile
    }

    pub fn revision(&self) -> Revision {
        self.profile.revision
    }

    /// Record a problem with the current element.
    pub fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(ParseIssue {
            path: self.path.join(" / "),
            message: message.into(),
        });
    }

    /// Issues recorded so far.
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ParseIssue> {
        self.issues
    }

    /// Wrap a value with the recorded issues.
    pub fn finish<T>(self, value: T) -> Parsed<T> {
        Parsed {
            value,
            issues: self.issues,
        }
    }

    fn enter(&mut self, kind: &str, name: &str) {
        self.path.push(format!("{kind} '{name}'"));
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    /// The child with the given local name, when the revision allows it.
    fn child_if<'e>(&self, element: &'e XmlElement, local: &str, allowed: bool) -> Option<&'e XmlElement> {
        let child = element.child(local)?;
        if allowed {
            Some(child)
        } else {
            warn!(
                element = local,
                revision = %self.revision(),
                "skipping element not defined in revision"
            );
            None
        }
    }
}

/// Options for [`DocumentReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Revision used when a document does not declare a known one.
    pub target_revision: Revision,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            target_revision: Revision::Std22,
        }
    }
}

/// Reads whole documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentReader {
    options: ReaderOptions,
}

impl DocumentReader {
    pub fn new(options: ReaderOptions) -> Self {
        DocumentReader { options }
    }

    /// Reader that falls back to `target_revision`.
    pub fn with_target(target_revision: Revision) -> Self {
        DocumentReader::new(ReaderOptions { target_revision })
    }

    pub fn options(&self) -> ReaderOptions {
        self.options
    }

    /// Read a document tree.
    pub fn parse(&self, document: &XmlDocument) -> Result<Parsed<Document>, ParseError> {
        let root = &document.root;
        let kind = root.local_name().parse::<VlnvType>();
        let kind = match kind {
            Ok(kind @ (VlnvType::BusDefinition | VlnvType::AbstractionDefinition | VlnvType::Component)) => kind,
            _ => return Err(ParseError::UnknownDocumentKind(root.local_name().to_string())),
        };

        let profile = self.detect_profile(root)?;
        debug!(%kind, revision = %profile.revision, "reading document");

        let mut ctx = ReadContext::new(profile);
        let mut value = match kind {
            VlnvType::BusDefinition => Document::BusDefinition(read_bus_definition(root, &mut ctx)),
            VlnvType::AbstractionDefinition => {
                Document::AbstractionDefinition(read_abstraction_definition(root, &mut ctx))
            }
            _ => Document::Component(read_component(root, &mut ctx)),
        };
        value.data_mut().prolog = document.prolog.clone();
        Ok(ctx.finish(value))
    }

    /// Parse text and read the resulting tree.
    pub fn parse_str(&self, text: &str) -> Result<Parsed<Document>, ParseError> {
        let document = XmlDocument::parse(text)?;
        self.parse(&document)
    }

    fn detect_profile(&self, root: &XmlElement) -> Result<&'static SchemaProfile, ParseError> {
        let declared = root
            .attributes
            .iter()
            .filter(|(key, _)| key == "xmlns" || key.starts_with("xmlns:"))
            .map(|(_, uri)| SchemaProfile::revision_for_namespace(uri))
            .find(|revision| *revision != Revision::Unknown)
            .unwrap_or(Revision::Unknown);

        if let Some(profile) = SchemaProfile::for_revision(declared) {
            return Ok(profile);
        }
        let profile = SchemaProfile::for_revision(self.options.target_revision)
            .ok_or(ParseError::UnsupportedRevision)?;
        warn!(
            revision = %profile.revision,
            "document declares no known IP-XACT namespace, using target revision"
        );
        Ok(profile)
    }
}
