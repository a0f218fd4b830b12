//! Error types for model operations.

use crate::vlnv::Vlnv;

/// Errors that can occur while building or looking up model entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A string is not a `vendor:library:name:version` identifier.
    #[error("invalid VLNV '{input}': expected vendor:library:name:version")]
    InvalidVlnv {
        /// The rejected input.
        input: String,
    },

    /// A document type name is not recognized.
    #[error("unknown document type '{0}'")]
    UnknownVlnvType(String),

    /// An enumerated attribute holds a value outside its vocabulary.
    #[error("unknown {kind} value '{value}'")]
    UnknownEnumValue {
        /// Which vocabulary was being parsed.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A library has no document for the given identifier.
    #[error("document not found: {0}")]
    DocumentNotFound(Vlnv),

    /// I/O error while a library stores or loads a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A library backend failed to encode or decode a document.
    #[error("library storage error: {detail}")]
    Storage {
        /// Description of the failure.
        detail: String,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
