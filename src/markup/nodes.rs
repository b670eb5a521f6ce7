use serde::Serialize;

/// A block-level element of parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Block {
    /// Consecutive non-list lines.
    Paragraph(Vec<Inline>),
    /// Bulleted list; one entry per item.
    UnorderedList(Vec<Vec<Inline>>),
    /// Numbered list; one entry per item.
    OrderedList(Vec<Vec<Inline>>),
}

/// An inline element of parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Inline {
    /// Literal text, unescaped.
    PlainText(String),
    /// `**...**`
    Bold(Vec<Inline>),
    /// `*...*`
    Italic(Vec<Inline>),
    /// A bare `http(s)://` URL.
    Url(String),
    /// `[[key]]`, with the key exactly as written.
    InternalLink {
        /// The reference between the brackets.
        key: String,
    },
    /// A line break inside a paragraph.
    LineBreak,
}

impl Inline {
    /// Calls `visit` on this node and every nested node, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        if let Self::Bold(children) | Self::Italic(children) = self {
            for child in children {
                child.walk(visit);
            }
        }
    }
}

impl Block {
    /// Every inline node in this block, depth first.
    #[must_use]
    pub fn inlines<'a>(&'a self) -> Vec<&'a Inline> {
        let mut found = Vec::new();
        let mut visit = |inline: &'a Inline| found.push(inline);
        match self {
            Self::Paragraph(inlines) => {
                for inline in inlines {
                    inline.walk(&mut visit);
                }
            }
            Self::UnorderedList(items) | Self::OrderedList(items) => {
                for inline in items.iter().flatten() {
                    inline.walk(&mut visit);
                }
            }
        }
        found
    }
}
