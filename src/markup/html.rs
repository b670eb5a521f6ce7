use super::{
    Block, Inline, Render,
    links::{Resolution, classify_internal_link},
};
use crate::domain::{Config, RevisionKeyIndex};

/// HTML renderer.
///
/// All text coming from content is escaped; only the tags generated here
/// are emitted unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Html {
    detail_base: String,
    search_base: String,
}

impl Default for Html {
    fn default() -> Self {
        Self::new("/services/", "/services/listed/")
    }
}

impl Html {
    /// Creates a renderer linking revisions to `{detail_base}{KEY}` and
    /// ambiguous references to `{search_base}?q=key::{KEY}`.
    #[must_use]
    pub fn new(detail_base: impl Into<String>, search_base: impl Into<String>) -> Self {
        Self {
            detail_base: detail_base.into(),
            search_base: search_base.into(),
        }
    }

    /// Creates a renderer using the link targets of `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.detail_base.clone(), config.search_base.clone())
    }

    fn inlines(&self, inlines: &[Inline], index: &RevisionKeyIndex, out: &mut String) {
        for inline in inlines {
            self.inline(inline, index, out);
        }
    }

    fn inline(&self, inline: &Inline, index: &RevisionKeyIndex, out: &mut String) {
        match inline {
            Inline::PlainText(text) => out.push_str(&escape_html(text)),
            Inline::Bold(children) => {
                out.push_str("<strong>");
                self.inlines(children, index, out);
                out.push_str("</strong>");
            }
            Inline::Italic(children) => {
                out.push_str("<em>");
                self.inlines(children, index, out);
                out.push_str("</em>");
            }
            Inline::Url(url) => {
                let url = escape_html(url);
                out.push_str(&format!("<a href=\"{url}\">{url}</a>"));
            }
            Inline::InternalLink { key } => out.push_str(&self.internal_link(key, index)),
            Inline::LineBreak => out.push_str("<br>\n"),
        }
    }

    fn internal_link(&self, key: &str, index: &RevisionKeyIndex) -> String {
        match classify_internal_link(key, index) {
            Resolution::Soft => escape_html(&format!("[[{key}]]")),
            Resolution::Unique(revision) => {
                let key = revision.key.to_string();
                let href = format!("{}{}", self.detail_base, urlencoding::encode(&key));
                let text = if revision.service_name.is_empty() {
                    revision.key.to_string()
                } else {
                    format!("{} ({})", revision.service_name, revision.key)
                };
                format!(
                    "<a href=\"{}\" title=\"{}\">{}</a>",
                    escape_html(&href),
                    escape_html(&format!("Direct link to service: {}", revision.service_name)),
                    escape_html(&text),
                )
            }
            Resolution::Multi(matches) => {
                let href = format!("{}?q=key::{}", self.search_base, urlencoding::encode(key));
                format!(
                    "<a href=\"{}\" title=\"{}\">{}</a>",
                    escape_html(&href),
                    escape_html(&format!("Search for \"{key}\" ({} matches)", matches.len())),
                    escape_html(key),
                )
            }
            Resolution::Broken => format!(
                "<span class=\"link-broken\" title=\"{}\">{}</span>",
                escape_html(&format!("No service found for \"{key}\"")),
                escape_html(&format!("[[{key}]]")),
            ),
        }
    }

    fn list(&self, tag: &str, items: &[Vec<Inline>], index: &RevisionKeyIndex, out: &mut String) {
        out.push_str(&format!("<{tag}>\n"));
        for item in items {
            out.push_str("<li>");
            self.inlines(item, index, out);
            out.push_str("</li>\n");
        }
        out.push_str(&format!("</{tag}>"));
    }
}

impl Render for Html {
    fn name(&self) -> &'static str {
        "html"
    }

    fn render(&self, blocks: &[Block], index: &RevisionKeyIndex) -> String {
        let mut out = String::new();
        for (position, block) in blocks.iter().enumerate() {
            if position > 0 {
                out.push('\n');
            }
            match block {
                Block::Paragraph(inlines) => {
                    out.push_str("<p>");
                    self.inlines(inlines, index, &mut out);
                    out.push_str("</p>");
                }
                Block::UnorderedList(items) => self.list("ul", items, index, &mut out),
                Block::OrderedList(items) => self.list("ol", items, index, &mut out),
            }
        }
        out
    }
}

/// Render blocks to HTML with the default link targets.
#[must_use]
pub fn render_html(blocks: &[Block], index: &RevisionKeyIndex) -> String {
    Html::default().render(blocks, index)
}

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
