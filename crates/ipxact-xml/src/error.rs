//! Error types for XML reading and writing.

use thiserror::Error;

/// Errors from the generic XML tree codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("malformed XML at byte {position}: {detail}")]
    Malformed {
        /// Byte offset where the problem was detected.
        position: u64,
        /// Description from the tokenizer.
        detail: String,
    },

    /// The input ended inside an element.
    #[error("unexpected end of input inside an element")]
    UnexpectedEof,

    /// The input contains no root element.
    #[error("document has no root element")]
    NoRootElement,

    /// Emitting XML failed.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Fatal document-level errors of the revision-aware reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The root element is not a supported document kind.
    #[error("unknown document kind '{0}'")]
    UnknownDocumentKind(String),

    /// Neither the document nor the caller names a supported revision.
    #[error("document revision could not be determined")]
    UnsupportedRevision,

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// A non-fatal problem found while reading one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Path of the element, e.g. `memoryMap 'regs' / addressBlock 'ctrl'`.
    pub path: String,
    /// What was wrong.
    pub message: String,
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result type for the XML tree codec.
pub type Result<T> = std::result::Result<T, XmlError>;
