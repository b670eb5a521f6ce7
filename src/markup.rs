//! Light markup for service text fields.
//!
//! Text is parsed once into a renderer-agnostic [`Block`] sequence and then
//! rendered to HTML or LaTeX. Internal `[[KEY]]` references are resolved at
//! render time against a [`RevisionKeyIndex`](crate::domain::RevisionKeyIndex).
//!
//! Supported syntax (full tier):
//!
//! - `**bold**` and `*italic*`
//! - lines starting with `- ` or `* ` (unordered lists) or `1. ` (ordered)
//! - `[[KEY]]` internal links
//! - bare `http://` and `https://` URLs
//!
//! Everything else is literal text. Parsing never fails: unmatched delimiters
//! stay as they were written.

mod nodes;
pub use nodes::{Block, Inline};

mod parser;
pub use parser::parse;

/// Internal link classification.
pub mod links;
pub use links::{LinkKind, Resolution, classify_internal_link};

mod html;
pub use html::{Html, escape_html, render_html};

mod latex;
pub use latex::{Latex, escape_latex, latex_url, render_latex, revision_label, service_label};

/// Markup detection and extraction for the validator.
pub mod detect;

use crate::domain::RevisionKeyIndex;

/// How much markup a text field supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Line breaks only.
    Strict,
    /// Line breaks and internal links.
    StrictLinked,
    /// Bold, italic, lists, URLs and internal links.
    Full,
}

impl Capability {
    /// `true` if `[[KEY]]` references are recognized.
    #[must_use]
    pub const fn links(self) -> bool {
        matches!(self, Self::StrictLinked | Self::Full)
    }

    /// `true` if emphasis, lists and URLs are recognized.
    #[must_use]
    pub const fn formatting(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// An output format for parsed markup.
///
/// Renderers never decide structure; they only translate the blocks they are
/// given, so every format agrees on emphasis, list and link boundaries.
pub trait Render {
    /// Short format name, e.g. `html`.
    fn name(&self) -> &'static str;

    /// Render a block sequence, resolving internal links against `index`.
    fn render(&self, blocks: &[Block], index: &RevisionKeyIndex) -> String;
}

/// Parse `text` and render it with `renderer`.
#[must_use]
pub fn render_text(
    text: &str,
    capability: Capability,
    renderer: &dyn Render,
    index: &RevisionKeyIndex,
) -> String {
    renderer.render(&parse(text, capability), index)
}
