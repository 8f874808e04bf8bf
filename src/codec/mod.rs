//! Bidirectional codec between a [`Record`](crate::model::Record) and its
//! flow document.
//!
//! - [`encode`](encode::encode) turns one record into a self-describing
//!   textual document plus a deterministic filename. Multi-line text fields
//!   become backtick literal blocks and script fields become function
//!   blocks, so both read as native text/script instead of escaped JSON
//!   strings.
//! - [`decode`](parse::decode) reverses the conventions with a
//!   recursive-descent parser over the fixed grammar. Documents are parsed
//!   as data, never executed.
//!
//! Encoding is deterministic: identical input yields byte-identical output,
//! which keeps content hashes over the document stable across saves.

pub mod encode;
pub mod escape;
pub mod parse;

pub use encode::{encode, sanitize_type, EncodedFile};
pub use escape::escape_text;
pub use parse::decode;

/// Extension carried by every per-record file.
pub const STORAGE_EXTENSION: &str = ".flows.js";

/// Opens the literal assignment of the record's non-extracted fields.
pub(crate) const NODE_PREFIX: &str = "const Node = ";

/// Fixed trailer exporting the record identifier.
pub(crate) const NODE_SUFFIX: &str = "module.exports = Node;";

/// One indent unit for script bodies.
pub(crate) const FUNC_INDENT: &str = "  ";

/// Blank-line separator between document sections.
pub(crate) const SEPARATOR: &str = "\n\n";
