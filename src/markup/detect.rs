use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use super::{Block, Capability, Inline, parse};

/// A kind of markup found in a field that cannot display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    /// `**...**`
    Bold,
    /// `*...*`
    Italic,
    /// `- ...`
    UnorderedList,
    /// `1. ...`
    OrderedList,
    /// `https://...`
    Url,
    /// `[[...]]`
    InternalLink,
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bold => "bold (**...**)",
            Self::Italic => "italic (*...*)",
            Self::UnorderedList => "unordered list (- ...)",
            Self::OrderedList => "ordered list (1. ...)",
            Self::Url => "URL (https://...)",
            Self::InternalLink => "internal link ([[...]])",
        };
        f.write_str(label)
    }
}

/// Markup in `text` that a field with `capability` would show literally.
///
/// The text is parsed as if it allowed everything; whatever the field's own
/// tier does not support is reported, once per kind, in a fixed order.
#[must_use]
pub fn unsupported_markup(text: &str, capability: Capability) -> Vec<Markup> {
    if capability.formatting() {
        return Vec::new();
    }
    let mut found = BTreeSet::new();
    for block in parse(text, Capability::Full) {
        match block {
            Block::UnorderedList(_) => {
                found.insert(Markup::UnorderedList);
            }
            Block::OrderedList(_) => {
                found.insert(Markup::OrderedList);
            }
            Block::Paragraph(_) => {}
        }
        for inline in block.inlines() {
            let markup = match inline {
                Inline::Bold(_) => Markup::Bold,
                Inline::Italic(_) => Markup::Italic,
                Inline::Url(_) => Markup::Url,
                Inline::InternalLink { .. } if !capability.links() => Markup::InternalLink,
                _ => continue,
            };
            found.insert(markup);
        }
    }
    found.into_iter().collect()
}

/// Every URL `text` would auto-link under `capability`, in order of
/// appearance.
#[must_use]
pub fn extract_urls(text: &str, capability: Capability) -> Vec<String> {
    collect(text, capability, |inline| match inline {
        Inline::Url(url) => Some(url.clone()),
        _ => None,
    })
}

/// Every `[[...]]` reference in `text` under `capability`, in order of
/// appearance.
#[must_use]
pub fn extract_internal_links(text: &str, capability: Capability) -> Vec<String> {
    collect(text, capability, |inline| match inline {
        Inline::InternalLink { key } => Some(key.clone()),
        _ => None,
    })
}

fn collect(
    text: &str,
    capability: Capability,
    select: impl Fn(&Inline) -> Option<String>,
) -> Vec<String> {
    parse(text, capability)
        .iter()
        .flat_map(Block::inlines)
        .filter_map(select)
        .collect()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("plain text\nwith two lines", &[]; "nothing")]
    #[test_case("**x** and *y*", &[Markup::Bold, Markup::Italic]; "emphasis")]
    #[test_case("- a\n1. b", &[Markup::UnorderedList, Markup::OrderedList]; "lists")]
    #[test_case("see https://example.org", &[Markup::Url]; "url")]
    #[test_case("see [[COLLAB-EMAIL]]", &[Markup::InternalLink]; "internal link")]
    fn strict_fields_report_everything(text: &str, expected: &[Markup]) {
        assert_eq!(unsupported_markup(text, Capability::Strict), expected);
    }

    #[test]
    fn linked_fields_allow_internal_links() {
        assert_eq!(
            unsupported_markup("**x** [[COLLAB-EMAIL]]", Capability::StrictLinked),
            vec![Markup::Bold]
        );
    }

    #[test]
    fn full_fields_report_nothing() {
        assert!(unsupported_markup("**x** - y", Capability::Full).is_empty());
    }

    #[test]
    fn findings_are_reported_once() {
        assert_eq!(
            unsupported_markup("**a** **b**", Capability::Strict),
            vec![Markup::Bold]
        );
    }

    #[test]
    fn extracts_urls_and_links_in_order() {
        let text = "**[[A-B]]** https://a.example, then\n- https://b.example [[email]]";
        assert_eq!(
            extract_urls(text, Capability::Full),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(
            extract_internal_links(text, Capability::Full),
            vec!["A-B", "email"]
        );
    }

    #[test]
    fn extraction_respects_the_tier() {
        let text = "https://a.example [[A-B]]";
        assert!(extract_urls(text, Capability::StrictLinked).is_empty());
        assert_eq!(extract_internal_links(text, Capability::StrictLinked), vec!["A-B"]);
        assert!(extract_internal_links(text, Capability::Strict).is_empty());
    }

    #[test]
    fn labels() {
        assert_eq!(Markup::Bold.to_string(), "bold (**...**)");
        assert_eq!(Markup::InternalLink.to_string(), "internal link ([[...]])");
    }
}
