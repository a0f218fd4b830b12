//! In-memory document library.
//!
//! [`MemoryLibrary`] implements [`LibraryInterface`] over a map keyed by
//! VLNV. Paths are virtual and follow the conventional on-disk layout:
//!
//! ```text
//! <root>/
//!   <vendor>/
//!     <library>/
//!       <name>/
//!         <version>/
//!           <name>.<version>.xml
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ipxact_core::{Document, LibraryInterface, ModelError, Revision, Vlnv};
use ipxact_xml::{DocumentReader, DocumentWriter, ParseIssue};
use tracing::debug;

use crate::error::Result;

/// A library holding documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    root: PathBuf,
    documents: BTreeMap<Vlnv, Document>,
}

impl MemoryLibrary {
    /// Create an empty library whose virtual paths start at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MemoryLibrary {
            root: root.into(),
            documents: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Identities of all stored documents, in VLNV order.
    pub fn vlnvs(&self) -> impl Iterator<Item = &Vlnv> {
        self.documents.keys()
    }

    /// Borrow a stored document.
    pub fn document(&self, vlnv: &Vlnv) -> Option<&Document> {
        self.documents.get(vlnv)
    }

    /// Store `document` under its own VLNV, returning the replaced one.
    pub fn insert(&mut self, document: Document) -> Result<Option<Document>> {
        let vlnv = document.vlnv().clone();
        if !vlnv.is_valid() {
            return Err(ModelError::InvalidVlnv {
                input: vlnv.to_string(),
            }
            .into());
        }
        debug!(%vlnv, kind = %document.kind(), "storing document");
        Ok(self.documents.insert(vlnv, document))
    }

    /// Remove and return a stored document.
    pub fn remove(&mut self, vlnv: &Vlnv) -> Result<Document> {
        self.documents
            .remove(vlnv)
            .ok_or_else(|| ModelError::DocumentNotFound(vlnv.clone()).into())
    }

    /// Read a document from XML text and store it. Returns its identity
    /// and the non-fatal issues found while reading.
    pub fn load_xml(&mut self, reader: &DocumentReader, text: &str) -> Result<(Vlnv, Vec<ParseIssue>)> {
        let parsed = reader.parse_str(text)?;
        let vlnv = parsed.value.vlnv().clone();
        self.insert(parsed.value)?;
        Ok((vlnv, parsed.issues))
    }

    /// Write a stored document as XML text in `revision`.
    pub fn export_xml(&self, writer: &DocumentWriter, vlnv: &Vlnv, revision: Revision) -> Result<String> {
        let document = self
            .documents
            .get(vlnv)
            .ok_or_else(|| ModelError::DocumentNotFound(vlnv.clone()))?;
        Ok(writer.write_string(document, revision)?)
    }
}

impl LibraryInterface for MemoryLibrary {
    fn resolve(&self, vlnv: &Vlnv) -> Option<Document> {
        self.documents.get(vlnv).cloned()
    }

    fn get_path(&self, vlnv: &Vlnv) -> Option<PathBuf> {
        self.documents.get(vlnv)?;
        let mut path = self.root.clone();
        for part in vlnv.parts() {
            path.push(part);
        }
        path.push(vlnv.file_name());
        Some(path)
    }

    fn write_model_to_file(&mut self, document: &Document) -> ipxact_core::Result<()> {
        let vlnv = document.vlnv().clone();
        if !vlnv.is_valid() {
            return Err(ModelError::InvalidVlnv {
                input: vlnv.to_string(),
            });
        }
        debug!(%vlnv, "writing model");
        self.documents.insert(vlnv, document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use ipxact_core::{BusDefinition, Component, VlnvType};

    fn uart_vlnv() -> Vlnv {
        Vlnv::new(VlnvType::Component, "acme", "ip", "uart", "1.0")
    }

    fn uart() -> Document {
        Component::new(uart_vlnv(), Revision::Std22).into()
    }

    #[test]
    fn resolve_returns_an_independent_copy() {
        let mut library = MemoryLibrary::new("/lib");
        library.write_model_to_file(&uart()).unwrap();

        let mut copy = library.resolve(&uart_vlnv()).unwrap();
        copy.data_mut().description = "changed".into();
        assert_eq!(library.document(&uart_vlnv()).unwrap().data().description, "");
    }

    #[test]
    fn identity_ignores_the_type_tag() {
        let mut library = MemoryLibrary::new("/lib");
        library.insert(uart()).unwrap();
        let untyped: Vlnv = "acme:ip:uart:1.0".parse().unwrap();
        assert!(library.contains(&untyped));
        assert!(!library.contains(&"acme:ip:uart:2.0".parse().unwrap()));
    }

    #[test]
    fn paths_follow_the_library_layout() {
        let mut library = MemoryLibrary::new("/lib");
        library.insert(uart()).unwrap();
        assert_eq!(
            library.get_path(&uart_vlnv()).unwrap(),
            PathBuf::from("/lib/acme/ip/uart/1.0/uart.1.0.xml")
        );
        assert_eq!(library.get_path(&"acme:ip:spi:1.0".parse().unwrap()), None);
    }

    #[test]
    fn writing_replaces_the_previous_version() {
        let mut library = MemoryLibrary::new("/lib");
        library.insert(uart()).unwrap();
        let mut updated = uart();
        updated.data_mut().description = "second".into();
        library.write_model_to_file(&updated).unwrap();

        assert_eq!(library.len(), 1);
        assert_eq!(library.resolve(&uart_vlnv()).unwrap().data().description, "second");
    }

    #[test]
    fn invalid_identity_is_rejected() {
        let mut library = MemoryLibrary::new("/lib");
        let bus: Document = BusDefinition::new(
            Vlnv::new(VlnvType::BusDefinition, "acme", "", "apb", "1.0"),
            Revision::Std14,
        )
        .into();
        assert!(matches!(
            library.write_model_to_file(&bus),
            Err(ModelError::InvalidVlnv { .. })
        ));
        assert!(matches!(library.insert(bus), Err(ApiError::Model(_))));
        assert!(library.is_empty());
    }

    #[test]
    fn removing_a_missing_document_fails() {
        let mut library = MemoryLibrary::new("/lib");
        let err = library.remove(&uart_vlnv()).unwrap_err();
        assert_eq!(err.to_string(), "document not found: acme:ip:uart:1.0");
    }
}
