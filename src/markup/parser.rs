use super::{
    Capability,
    nodes::{Block, Inline},
};

/// Characters that end a URL.
const URL_STOP: &[char] = &['<', '>', '"', '\'', '(', ')', '[', ']', '{', '}', '|', '\\', '^', '`'];

/// Punctuation dropped from the end of a URL.
const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Parse `text` into blocks, recognizing only what `capability` allows.
///
/// Blank lines separate segments. Inside a segment, consecutive list lines of
/// the same kind form one list; a change between bulleted and numbered
/// markers starts a new list. All other lines of a segment join into one
/// paragraph, separated by [`Inline::LineBreak`].
#[must_use]
pub fn parse(text: &str, capability: Capability) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut segment = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            parse_segment(&segment, capability, &mut blocks);
            segment.clear();
        } else {
            segment.push(line);
        }
    }
    parse_segment(&segment, capability, &mut blocks);
    blocks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

#[derive(Default)]
struct SegmentBuilder {
    paragraph: Vec<Inline>,
    list: Option<(ListKind, Vec<Vec<Inline>>)>,
}

impl SegmentBuilder {
    fn line(&mut self, line: &str, capability: Capability, blocks: &mut Vec<Block>) {
        self.flush_list(blocks);
        if !self.paragraph.is_empty() {
            self.paragraph.push(Inline::LineBreak);
        }
        self.paragraph.extend(inline(line.trim(), capability, true));
    }

    fn item(&mut self, kind: ListKind, content: &str, capability: Capability, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        let item = inline(content, capability, true);
        match &mut self.list {
            Some((current, items)) if *current == kind => items.push(item),
            _ => {
                self.flush_list(blocks);
                self.list = Some((kind, vec![item]));
            }
        }
    }

    fn flush_paragraph(&mut self, blocks: &mut Vec<Block>) {
        if !self.paragraph.is_empty() {
            blocks.push(Block::Paragraph(std::mem::take(&mut self.paragraph)));
        }
    }

    fn flush_list(&mut self, blocks: &mut Vec<Block>) {
        match self.list.take() {
            Some((ListKind::Unordered, items)) => blocks.push(Block::UnorderedList(items)),
            Some((ListKind::Ordered, items)) => blocks.push(Block::OrderedList(items)),
            None => {}
        }
    }

    fn finish(mut self, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        self.flush_list(blocks);
    }
}

fn parse_segment(lines: &[&str], capability: Capability, blocks: &mut Vec<Block>) {
    let mut builder = SegmentBuilder::default();
    for line in lines {
        let marker = if capability.formatting() {
            list_marker(line)
        } else {
            None
        };
        match marker {
            Some((kind, content)) => builder.item(kind, content, capability, blocks),
            None => builder.line(line, capability, blocks),
        }
    }
    builder.finish(blocks);
}

/// Recognizes `- `, `* ` and `<digits>. ` at the start of a line.
fn list_marker(line: &str) -> Option<(ListKind, &str)> {
    let trimmed = line.trim_start();
    let (kind, rest) = if let Some(rest) = trimmed.strip_prefix(['-', '*']) {
        (ListKind::Unordered, rest)
    } else {
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        (ListKind::Ordered, trimmed[digits..].strip_prefix('.')?)
    };
    rest.starts_with(char::is_whitespace)
        .then(|| (kind, rest.trim()))
}

/// Parse one line of inline content.
///
/// `emphasis` is false inside bold and italic spans, where only links and
/// URLs are recognized.
fn inline(text: &str, capability: Capability, emphasis: bool) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut previous: Option<char> = None;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some((node, consumed)) = token(rest, previous, capability, emphasis) {
            if !plain.is_empty() {
                nodes.push(Inline::PlainText(std::mem::take(&mut plain)));
            }
            nodes.push(node);
            previous = rest[..consumed].chars().next_back();
            rest = &rest[consumed..];
        } else {
            plain.push(c);
            previous = Some(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    if !plain.is_empty() {
        nodes.push(Inline::PlainText(plain));
    }
    nodes
}

/// Try each inline construct at the start of `rest`, longest delimiter first.
fn token(
    rest: &str,
    previous: Option<char>,
    capability: Capability,
    emphasis: bool,
) -> Option<(Inline, usize)> {
    if capability.links() {
        if let Some(found) = internal_link(rest) {
            return Some(found);
        }
    }
    if !capability.formatting() {
        return None;
    }
    if let Some(found) = url(rest, previous) {
        return Some(found);
    }
    if !emphasis {
        return None;
    }
    bold(rest, capability).or_else(|| italic(rest, previous, capability))
}

fn internal_link(rest: &str) -> Option<(Inline, usize)> {
    let inner = rest.strip_prefix("[[")?;
    let end = inner.find("]]")?;
    let key = &inner[..end];
    if key.trim().is_empty() || key.contains(['[', ']']) {
        return None;
    }
    Some((
        Inline::InternalLink {
            key: key.to_string(),
        },
        end + 4,
    ))
}

fn url(rest: &str, previous: Option<char>) -> Option<(Inline, usize)> {
    if previous.is_some_and(char::is_alphanumeric) {
        return None;
    }
    let scheme = ["https://", "http://"]
        .into_iter()
        .find(|scheme| {
            rest.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        })?
        .len();
    let end = rest[scheme..]
        .find(|c: char| c.is_whitespace() || URL_STOP.contains(&c))
        .map_or(rest.len(), |offset| scheme + offset);
    let found = rest[..end].trim_end_matches(URL_TRAILING);
    (found.len() > scheme).then(|| (Inline::Url(found.to_string()), found.len()))
}

/// `true` if all of `s` is one bare URL as the parser would recognize it.
pub fn is_bare_url(s: &str) -> bool {
    url(s, None).is_some_and(|(_, len)| len == s.len())
}

/// The text between `delimiter` pairs, if it is a valid emphasis span.
fn emphasis_content<'a>(rest: &'a str, delimiter: &str) -> Option<&'a str> {
    let inner = rest.strip_prefix(delimiter)?;
    let end = inner.find('*')?;
    let content = &inner[..end];
    let valid = !content.is_empty()
        && !content.starts_with(char::is_whitespace)
        && !content.ends_with(char::is_whitespace)
        && inner[end..].starts_with(delimiter)
        && !inner[end + delimiter.len()..].starts_with('*');
    valid.then_some(content)
}

fn bold(rest: &str, capability: Capability) -> Option<(Inline, usize)> {
    let content = emphasis_content(rest, "**")?;
    Some((
        Inline::Bold(inline(content, capability, false)),
        content.len() + 4,
    ))
}

fn italic(rest: &str, previous: Option<char>, capability: Capability) -> Option<(Inline, usize)> {
    if previous == Some('*') || rest.starts_with("**") {
        return None;
    }
    let content = emphasis_content(rest, "*")?;
    Some((
        Inline::Italic(inline(content, capability, false)),
        content.len() + 2,
    ))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn text(s: &str) -> Inline {
        Inline::PlainText(s.to_string())
    }

    fn link(key: &str) -> Inline {
        Inline::InternalLink {
            key: key.to_string(),
        }
    }

    fn url(s: &str) -> Inline {
        Inline::Url(s.to_string())
    }

    fn paragraph(text: &str, capability: Capability) -> Vec<Inline> {
        match parse(text, capability).as_slice() {
            [Block::Paragraph(inlines)] => inlines.clone(),
            other => panic!("expected a single paragraph, got {other:?}"),
        }
    }

    #[test_case(""; "empty")]
    #[test_case("\n\n  \n"; "blank lines only")]
    fn empty_input_has_no_blocks(input: &str) {
        assert!(parse(input, Capability::Full).is_empty());
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            paragraph("**bold** and *italic*", Capability::Full),
            vec![
                Inline::Bold(vec![text("bold")]),
                text(" and "),
                Inline::Italic(vec![text("italic")]),
            ]
        );
    }

    #[test_case("**open"; "unclosed bold")]
    #[test_case("*open"; "unclosed italic")]
    #[test_case("a ** b"; "spaced double star")]
    #[test_case("2 * 3 * 4"; "multiplication")]
    #[test_case("**"; "bare delimiter")]
    fn unmatched_delimiters_stay_literal(input: &str) {
        assert_eq!(paragraph(input, Capability::Full), vec![text(input)]);
    }

    #[test]
    fn links_and_urls_inside_emphasis() {
        assert_eq!(
            paragraph("**see [[COLLAB-EMAIL]]**", Capability::Full),
            vec![Inline::Bold(vec![text("see "), link("COLLAB-EMAIL")])]
        );
        assert_eq!(
            paragraph("*https://example.org*", Capability::Full),
            vec![Inline::Italic(vec![url("https://example.org")])]
        );
    }

    #[test]
    fn internal_link_content_is_literal() {
        assert_eq!(
            paragraph("go to [[*A-B*]] now", Capability::Full),
            vec![text("go to "), link("*A-B*"), text(" now")]
        );
    }

    #[test_case("[[]]"; "empty")]
    #[test_case("[[ ]]"; "blank")]
    #[test_case("[[a]b]]"; "nested bracket")]
    #[test_case("[[open"; "unclosed")]
    fn malformed_internal_links_stay_literal(input: &str) {
        assert!(
            !paragraph(input, Capability::Full)
                .iter()
                .any(|inline| matches!(inline, Inline::InternalLink { .. }))
        );
    }

    #[test_case("see https://example.org.", "https://example.org"; "trailing period")]
    #[test_case("(https://example.org/a)", "https://example.org/a"; "parentheses")]
    #[test_case("https://example.org/x?y=1, next", "https://example.org/x?y=1"; "trailing comma")]
    #[test_case("HTTP://EXAMPLE.ORG", "HTTP://EXAMPLE.ORG"; "upper case scheme")]
    #[test_case("<https://example.org/ä>", "https://example.org/ä"; "angle brackets")]
    fn url_boundaries(input: &str, expected: &str) {
        let found: Vec<_> = paragraph(input, Capability::Full)
            .into_iter()
            .filter_map(|inline| match inline {
                Inline::Url(url) => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(found, vec![expected.to_string()]);
    }

    #[test_case("xhttps://example.org"; "inside a word")]
    #[test_case("https://"; "scheme only")]
    #[test_case("ftp://example.org"; "other scheme")]
    fn not_a_url(input: &str) {
        assert_eq!(paragraph(input, Capability::Full), vec![text(input)]);
    }

    #[test]
    fn lines_in_a_segment_keep_their_breaks() {
        assert_eq!(
            paragraph("first\nsecond", Capability::Full),
            vec![text("first"), Inline::LineBreak, text("second")]
        );
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        assert_eq!(
            parse("one\n\ntwo", Capability::Strict),
            vec![
                Block::Paragraph(vec![text("one")]),
                Block::Paragraph(vec![text("two")]),
            ]
        );
    }

    #[test]
    fn list_kind_change_starts_a_new_list() {
        assert_eq!(
            parse("- a\n- b\n1. c", Capability::Full),
            vec![
                Block::UnorderedList(vec![vec![text("a")], vec![text("b")]]),
                Block::OrderedList(vec![vec![text("c")]]),
            ]
        );
    }

    #[test]
    fn lists_and_paragraphs_in_one_segment() {
        assert_eq!(
            parse("Options:\n* one\n* **two**\n12. three\nDone", Capability::Full),
            vec![
                Block::Paragraph(vec![text("Options:")]),
                Block::UnorderedList(vec![
                    vec![text("one")],
                    vec![Inline::Bold(vec![text("two")])],
                ]),
                Block::OrderedList(vec![vec![text("three")]]),
                Block::Paragraph(vec![text("Done")]),
            ]
        );
    }

    #[test_case("-dash"; "no space after dash")]
    #[test_case("1.5 litres"; "decimal number")]
    #[test_case("**bold** start"; "bold at line start")]
    fn not_a_list_item(input: &str) {
        assert!(matches!(
            parse(input, Capability::Full).as_slice(),
            [Block::Paragraph(_)]
        ));
    }

    #[test]
    fn strict_only_breaks_lines() {
        assert_eq!(
            paragraph("**x** [[A-B]]\n- item https://example.org", Capability::Strict),
            vec![
                text("**x** [[A-B]]"),
                Inline::LineBreak,
                text("- item https://example.org"),
            ]
        );
    }

    #[test]
    fn strict_linked_recognizes_only_links() {
        assert_eq!(
            paragraph("*see* [[COLLAB-EMAIL]]", Capability::StrictLinked),
            vec![text("*see* "), link("COLLAB-EMAIL")]
        );
    }

    #[test]
    fn unsupported_syntax_is_literal() {
        let input = "# Heading\n> quote\n`code`";
        assert_eq!(
            paragraph(input, Capability::Full),
            vec![
                text("# Heading"),
                Inline::LineBreak,
                text("> quote"),
                Inline::LineBreak,
                text("`code`"),
            ]
        );
    }

    #[test]
    fn windows_line_endings() {
        assert_eq!(
            paragraph("a\r\nb", Capability::Full),
            vec![text("a"), Inline::LineBreak, text("b")]
        );
    }
}
