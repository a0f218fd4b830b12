//! IP-XACT XML reading and writing.
//!
//! Two layers:
//!
//! - [`XmlDocument`] converts between text and a generic element tree,
//!   keeping the prolog (comments and processing instructions before the
//!   root) and every element, attribute, and text node.
//! - [`DocumentReader`] and [`DocumentWriter`] convert between that tree and
//!   the typed model for one schema revision. Revision differences are
//!   looked up in a [`SchemaProfile`].
//!
//! ```text
//! text ──XmlDocument::parse──▶ tree ──DocumentReader::parse──▶ Document
//! text ◀─XmlDocument::to_xml_string── tree ◀──DocumentWriter::write── Document
//! ```

pub mod error;
pub mod profile;
pub mod reader;
pub mod tree;
pub mod writer;

pub use error::{ParseError, ParseIssue, Result, XmlError};
pub use profile::{SchemaProfile, STD14, STD22};
pub use reader::{DocumentReader, Parsed, ReadContext, ReaderOptions};
pub use tree::XmlDocument;
pub use writer::{DocumentWriter, WriterOptions};
