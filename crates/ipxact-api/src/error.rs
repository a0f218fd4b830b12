//! Error types for facade, library, and configuration operations.

use ipxact_core::ModelError;
use ipxact_xml::{ParseError, XmlError};

/// Errors that can occur in facade, library, and configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Model or library error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A document could not be read.
    #[error("document parse error: {0}")]
    Parse(#[from] ParseError),

    /// A document could not be written.
    #[error("document write error: {0}")]
    Xml(#[from] XmlError),

    /// No item with the given name.
    #[error("no item named '{0}'")]
    ItemNotFound(String),

    /// An item with the given name already exists.
    #[error("an item named '{0}' already exists")]
    DuplicateName(String),

    /// The item has no such attribute, e.g. the range of a subspace map.
    #[error("{item} has no {attribute}")]
    NotApplicable {
        /// Name of the item.
        item: String,
        /// Attribute that was requested.
        attribute: &'static str,
    },
}

/// Result type for facade, library, and configuration operations.
pub type Result<T> = std::result::Result<T, ApiError>;
