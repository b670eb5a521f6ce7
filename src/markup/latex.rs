use super::{
    Block, Inline, Render,
    links::{Resolution, classify_internal_link},
    parser::is_bare_url,
};
use crate::domain::{RevisionKeyIndex, key::sanitize_label};

/// LaTeX renderer.
///
/// Internal links become `\hyperref` cross-references to the `svc:` and
/// `rev:` labels written by the catalogue export, see [`service_label`] and
/// [`revision_label`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latex;

impl Latex {
    fn inlines(inlines: &[Inline], index: &RevisionKeyIndex, out: &mut String) {
        for inline in inlines {
            Self::inline(inline, index, out);
        }
    }

    fn inline(inline: &Inline, index: &RevisionKeyIndex, out: &mut String) {
        match inline {
            Inline::PlainText(text) => out.push_str(&escape_latex(text)),
            Inline::Bold(children) => {
                out.push_str("\\textbf{");
                Self::inlines(children, index, out);
                out.push('}');
            }
            Inline::Italic(children) => {
                out.push_str("\\textit{");
                Self::inlines(children, index, out);
                out.push('}');
            }
            Inline::Url(url) => out.push_str(&latex_url(url)),
            Inline::InternalLink { key } => out.push_str(&internal_link(key, index)),
            Inline::LineBreak => out.push_str("\\newline\n"),
        }
    }

    fn list(environment: &str, items: &[Vec<Inline>], index: &RevisionKeyIndex, out: &mut String) {
        out.push_str(&format!("\\begin{{{environment}}}\n"));
        for item in items {
            // `{}` keeps a leading `[` from becoming the item label
            out.push_str("  \\item{} ");
            Self::inlines(item, index, out);
            out.push('\n');
        }
        out.push_str(&format!("\\end{{{environment}}}"));
    }
}

fn internal_link(key: &str, index: &RevisionKeyIndex) -> String {
    match classify_internal_link(key, index) {
        Resolution::Unique(revision) => format!(
            "\\hyperref[rev:{}]{{{}}}",
            sanitize_label(&revision.key.to_string()),
            escape_latex(key)
        ),
        Resolution::Multi(_) => format!(
            "\\hyperref[svc:{}]{{{}}}",
            sanitize_label(key),
            escape_latex(key)
        ),
        Resolution::Soft | Resolution::Broken => escape_latex(&format!("[[{key}]]")),
    }
}

impl Render for Latex {
    fn name(&self) -> &'static str {
        "latex"
    }

    fn render(&self, blocks: &[Block], index: &RevisionKeyIndex) -> String {
        let mut out = String::new();
        for (position, block) in blocks.iter().enumerate() {
            if position > 0 {
                out.push_str("\n\n");
            }
            match block {
                Block::Paragraph(inlines) => Self::inlines(inlines, index, &mut out),
                Block::UnorderedList(items) => Self::list("itemize", items, index, &mut out),
                Block::OrderedList(items) => Self::list("enumerate", items, index, &mut out),
            }
        }
        out
    }
}

/// Render blocks to a LaTeX fragment.
#[must_use]
pub fn render_latex(blocks: &[Block], index: &RevisionKeyIndex) -> String {
    Latex.render(blocks, index)
}

/// Escape every LaTeX special character in literal text.
#[must_use]
pub fn escape_latex(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '\\' => escaped.push_str("\\textbackslash{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A URL as `\url{...}`, or as escaped text if `url` is not one clean URL.
///
/// Stored URLs are free text; anything the markup parser would not accept as
/// a bare URL (whitespace, braces, backslashes) is written literally.
#[must_use]
pub fn latex_url(url: &str) -> String {
    if is_bare_url(url) {
        format!("\\url{{{}}}", url.replace('%', "\\%").replace('#', "\\#"))
    } else {
        escape_latex(url)
    }
}

/// The `\label` command for a service, e.g. `\label{svc:collab-email}`.
#[must_use]
pub fn service_label(service_key: &str) -> String {
    format!("\\label{{svc:{}}}", sanitize_label(service_key))
}

/// The `\label` command for a revision, e.g. `\label{rev:collab-email-2.0}`.
#[must_use]
pub fn revision_label(revision_key: &str) -> String {
    format!("\\label{{rev:{}}}", sanitize_label(revision_key))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use test_case::test_case;

    use super::*;
    use crate::{
        domain::IndexedRevision,
        markup::{Capability, parse},
    };

    fn index(keys: &[&str]) -> RevisionKeyIndex {
        let today: NaiveDate = "2024-06-01".parse().unwrap();
        let mut index = RevisionKeyIndex::new(today);
        for key in keys {
            index.insert(IndexedRevision {
                key: key.parse().unwrap(),
                service_name: "Email".to_string(),
                listed_from: Some("2024-01-01".parse().unwrap()),
                listed_until: None,
            });
        }
        index
    }

    fn latex(text: &str, index: &RevisionKeyIndex) -> String {
        render_latex(&parse(text, Capability::Full), index)
    }

    #[test]
    fn bold_wraps_exactly_the_text() {
        assert_eq!(latex("**bold**", &index(&[])), "\\textbf{bold}");
    }

    #[test]
    fn lists_use_environments() {
        assert_eq!(
            latex("- a\n- *b*\n1. c", &index(&[])),
            "\\begin{itemize}\n  \\item{} a\n  \\item{} \\textit{b}\n\\end{itemize}\n\n\
             \\begin{enumerate}\n  \\item{} c\n\\end{enumerate}"
        );
    }

    #[test]
    fn paragraphs_and_line_breaks() {
        assert_eq!(
            latex("one\ntwo\n\nthree", &index(&[])),
            "one\\newline\ntwo\n\nthree"
        );
    }

    #[test]
    fn special_characters_are_escaped() {
        let out = latex("100% of R&D_budget", &index(&[]));
        assert_eq!(out, "100\\% of R\\&D\\_budget");
        for special in ['%', '&', '_'] {
            let unescaped = out
                .char_indices()
                .filter(|&(_, c)| c == special)
                .any(|(i, _)| !out[..i].ends_with('\\'));
            assert!(!unescaped, "unescaped {special} in {out}");
        }
    }

    #[test_case("$x$", "\\$x\\$"; "dollar")]
    #[test_case("#1 {a}", "\\#1 \\{a\\}"; "hash and braces")]
    #[test_case("a~b^c", "a\\textasciitilde{}b\\textasciicircum{}c"; "tilde and caret")]
    #[test_case("C:\\path", "C:\\textbackslash{}path"; "backslash")]
    fn escape_table(input: &str, expected: &str) {
        assert_eq!(escape_latex(input), expected);
    }

    #[test_case("- [[email]] soft", "  \\item{} [[email]] soft"; "soft link")]
    #[test_case("- [[COLLAB-NOPE]]", "  \\item{} [[COLLAB-NOPE]]"; "broken link")]
    #[test_case("1. [draft] note", "  \\item{} [draft] note"; "bracketed text")]
    fn items_starting_with_a_bracket_keep_their_bullet(input: &str, item: &str) {
        let out = latex(input, &index(&[]));
        assert!(out.contains(item), "{out}");
        assert!(!out.contains("\\item ["), "{out}");
    }

    #[test_case("https://example.org/a%20b", "\\url{https://example.org/a\\%20b}"; "clean")]
    #[test_case("https://example.org/{x}", "https://example.org/\\{x\\}"; "braces")]
    #[test_case("see https://example.org", "see https://example.org"; "surrounding text")]
    #[test_case("https://example.org/a\\b", "https://example.org/a\\textbackslash{}b"; "backslash")]
    #[test_case("intranet/wiki", "intranet/wiki"; "not a url")]
    fn stored_urls(input: &str, expected: &str) {
        assert_eq!(latex_url(input), expected);
    }

    #[test]
    fn urls_keep_their_text() {
        assert_eq!(
            latex("https://example.org/a_b#top", &index(&[])),
            "\\url{https://example.org/a_b\\#top}"
        );
    }

    #[test]
    fn unique_and_multi_links_are_cross_references() {
        assert_eq!(
            latex("[[COLLAB-EMAIL]]", &index(&["COLLAB-EMAIL-1.0"])),
            "\\hyperref[rev:collab-email-1.0]{COLLAB-EMAIL}"
        );
        assert_eq!(
            latex(
                "[[COLLAB-EMAIL]]",
                &index(&["COLLAB-EMAIL-1.0", "COLLAB-EMAIL-2.0"])
            ),
            "\\hyperref[svc:collab-email]{COLLAB-EMAIL}"
        );
    }

    #[test]
    fn soft_and_broken_links_are_literal() {
        assert_eq!(latex("[[e_mail]]", &index(&[])), "[[e\\_mail]]");
        assert_eq!(latex("[[COLLAB-NOPE]]", &index(&[])), "[[COLLAB-NOPE]]");
    }

    #[test]
    fn renderers_name_their_format() {
        let renderers: [&dyn Render; 2] = [&Latex, &crate::markup::Html::default()];
        let names: Vec<_> = renderers.iter().map(|renderer| renderer.name()).collect();
        assert_eq!(names, ["latex", "html"]);
    }

    #[test]
    fn labels() {
        assert_eq!(service_label("COLLAB-EMAIL"), "\\label{svc:collab-email}");
        assert_eq!(revision_label("COMPUTE-HPC-2.1"), "\\label{rev:compute-hpc-2.1}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let index = index(&["COLLAB-EMAIL-1.0"]);
        let blocks = parse("**a** [[COLLAB-EMAIL]] 50%\n- x", Capability::Full);
        assert_eq!(render_latex(&blocks, &index), render_latex(&blocks, &index));
    }
}
