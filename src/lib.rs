//! Multilingual IT service catalogue
//!
//! Services and their revisions are YAML documents stored in a directory.
//! The library decides which revisions are listed, available, new or about
//! to be discontinued, and renders their text fields from a small markup
//! language to HTML or LaTeX, resolving `[[KEY]]` cross-references against
//! the revisions that are currently listed.

pub mod api;

pub mod domain;
pub use domain::{Catalogue, Config, RevisionKey, RevisionKeyIndex, ServiceKey, TextField};

pub mod markup;
pub use markup::{Block, Capability, Inline, parse, render_html, render_latex};

/// Filesystem storage and directory management for catalogues.
pub mod storage;
pub use storage::Directory;
