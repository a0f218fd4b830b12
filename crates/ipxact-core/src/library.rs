//! Library contract used to resolve VLNV references.

use std::path::PathBuf;

use crate::document::Document;
use crate::error::Result;
use crate::vlnv::Vlnv;

/// A store of documents keyed by VLNV.
///
/// Lookups return owned copies; callers are responsible for staleness.
/// Implementations are not required to be thread-safe.
pub trait LibraryInterface {
    /// Copy of the document with the given identity.
    fn resolve(&self, vlnv: &Vlnv) -> Option<Document>;

    /// Where the document with the given identity is stored.
    fn get_path(&self, vlnv: &Vlnv) -> Option<PathBuf>;

    /// Store a document under its own VLNV, replacing any previous version.
    fn write_model_to_file(&mut self, document: &Document) -> Result<()>;

    /// Whether a document with the given identity exists.
    fn contains(&self, vlnv: &Vlnv) -> bool {
        self.get_path(vlnv).is_some()
    }
}
