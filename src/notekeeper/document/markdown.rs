//! Markdown form of a [`Document`], as stored in `Note.content`.
//!
//! Writing is done here by hand so the output is stable:
//!
//! | Block / format     | Markdown        |
//! |--------------------|-----------------|
//! | Heading1           | `# text`        |
//! | Heading2           | `## text`       |
//! | Blockquote         | `> text`        |
//! | bullet ListItem    | `- text`        |
//! | ordered ListItem   | `3. text`       |
//! | Bold / Italic      | `**b**` / `*i*` |
//! | Underline          | `<u>u</u>`      |
//!
//! A bold or italic run whose `*` delimiters would not open or close where
//! they stand (edge spaces, punctuation against a letter, a formatted
//! neighbour) is written as `<b>`/`<i>` instead. Whitespace at either end of
//! a line is written as character references so it survives parsing.
//!
//! Reading goes through `pulldown-cmark`, so any CommonMark a user pastes in
//! is understood. Constructs the editor has no block for degrade: deeper
//! headings become Heading2, code becomes plain text, links keep their text.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Block, BlockKind, Document, Format, FormatSet, Run};

pub fn to_markdown(doc: &Document) -> String {
    if doc.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut previous: Option<&Block> = None;
    for block in doc.blocks() {
        if let Some(prev) = previous {
            let same_list = matches!(
                (prev.kind.list_ordering(), block.kind.list_ordering()),
                (Some(a), Some(b)) if a == b
            );
            out.push_str(if same_list { "\n" } else { "\n\n" });
        }
        out.push_str(&block_prefix(&block.kind));
        out.push_str(&escape_line_start(&inline_markdown(&block.runs)));
        previous = Some(block);
    }
    out
}

fn block_prefix(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Paragraph => String::new(),
        BlockKind::Heading1 => "# ".to_string(),
        BlockKind::Heading2 => "## ".to_string(),
        BlockKind::Blockquote => "> ".to_string(),
        BlockKind::ListItem { ordered: false, .. } => "- ".to_string(),
        BlockKind::ListItem {
            ordered: true,
            index,
        } => format!("{}. ", index),
    }
}

fn inline_markdown(runs: &[Run]) -> String {
    let mut out = String::new();
    for (i, run) in runs.iter().enumerate() {
        if run.text.is_empty() {
            continue;
        }
        if run.formats.is_empty() {
            out.push_str(&escape_inline(&run.text));
            continue;
        }
        // `*` delimiters must hug the text and flank it; any other run is
        // wrapped in tags, which keep edge spaces inside the formatting.
        let before = out.chars().last();
        let after = runs.get(i + 1).map(Delimited::of);
        let text = escape_inline(&run.text);
        let html = run.text.trim() != run.text || !flanks(before, &text, after);

        let bold = run.formats.contains(&Format::Bold);
        let italic = run.formats.contains(&Format::Italic);
        if run.formats.contains(&Format::Underline) {
            out.push_str("<u>");
        }
        match (bold, html) {
            (true, true) => out.push_str("<b>"),
            (true, false) => out.push_str("**"),
            _ => {}
        }
        match (italic, html) {
            (true, true) => out.push_str("<i>"),
            (true, false) => out.push('*'),
            _ => {}
        }
        out.push_str(&text);
        match (italic, html) {
            (true, true) => out.push_str("</i>"),
            (true, false) => out.push('*'),
            _ => {}
        }
        match (bold, html) {
            (true, true) => out.push_str("</b>"),
            (true, false) => out.push_str("**"),
            _ => {}
        }
        if run.formats.contains(&Format::Underline) {
            out.push_str("</u>");
        }
    }
    out
}

/// What the markdown of the following run starts with.
enum Delimited {
    Char(char),
    /// A formatted run, which opens with a delimiter or a tag.
    Formatted,
}

impl Delimited {
    fn of(run: &Run) -> Self {
        match run.text.chars().next() {
            Some(ch) if ch.is_whitespace() => Delimited::Char(ch),
            _ if !run.formats.is_empty() => Delimited::Formatted,
            Some(ch) => Delimited::Char(escape_inline(&ch.to_string()).chars().next().unwrap_or(ch)),
            None => Delimited::Formatted,
        }
    }
}

/// Whether `*` delimiters around `text` open and close under CommonMark's
/// flanking rules, given the characters on either side.
fn flanks(before: Option<char>, text: &str, after: Option<Delimited>) -> bool {
    let (Some(first), Some(last)) = (text.chars().next(), text.chars().last()) else {
        return false;
    };
    let opens = match before {
        None => true,
        Some('*') => false,
        Some(ch) => !is_punctuation(first) || ch.is_whitespace() || is_punctuation(ch),
    };
    let closes = match after {
        None => true,
        Some(Delimited::Formatted) => false,
        Some(Delimited::Char(ch)) => {
            !is_punctuation(last) || ch.is_whitespace() || is_punctuation(ch)
        }
    };
    opens && closes
}

fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || (!ch.is_alphanumeric() && !ch.is_whitespace())
}

fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '*' | '_' | '<' | '>' | '`' | '[' | ']' | '&' | '!' | '|' | '~' | '#'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Keeps a block's text literal at the start and end of its line.
///
/// Edge whitespace is written as character references, since CommonMark
/// strips it (and four leading spaces would open a code block). Heading,
/// list and rule markers are escaped, also behind indentation.
fn escape_line_start(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];
    let content = body.trim_end_matches([' ', '\t']);
    let tail = &body[content.len()..];

    let mut out = String::with_capacity(line.len());
    push_references(&mut out, indent);
    if content.starts_with(['#', '-', '+', '=']) {
        out.push('\\');
        out.push_str(content);
    } else {
        let digits = content.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && content[digits..].starts_with(['.', ')']) {
            out.push_str(&content[..digits]);
            out.push('\\');
            out.push_str(&content[digits..]);
        } else {
            out.push_str(content);
        }
    }
    push_references(&mut out, tail);
    out
}

fn push_references(out: &mut String, whitespace: &str) {
    for ch in whitespace.chars() {
        out.push_str(&format!("&#{};", ch as u32));
    }
}

pub fn from_markdown(source: &str) -> Document {
    let mut reader = Reader::default();
    for event in Parser::new_ext(source, Options::empty()) {
        reader.handle(event);
    }
    reader.finish()
}

#[derive(Default)]
struct Reader {
    blocks: Vec<Block>,
    current: Option<Block>,
    quote_depth: usize,
    lists: Vec<(bool, u32)>,
    item_depth: usize,
    bold: usize,
    italic: usize,
    underline: usize,
}

impl Reader {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                let kind = if level == HeadingLevel::H1 {
                    BlockKind::Heading1
                } else {
                    BlockKind::Heading2
                };
                self.current = Some(Block::new(kind));
            }
            Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock { .. }) => {
                if self.item_depth == 0 {
                    self.flush();
                }
                self.ensure_block();
            }
            Event::End(TagEnd::Heading { .. }) | Event::End(TagEnd::CodeBlock) => self.flush(),
            Event::End(TagEnd::Paragraph) => {
                if self.item_depth == 0 {
                    self.flush();
                }
            }
            Event::Start(Tag::BlockQuote { .. }) => {
                self.flush();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote { .. }) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                let ordered = start.is_some();
                let first = start.map(|n| n.clamp(1, u32::MAX as u64) as u32).unwrap_or(1);
                self.lists.push((ordered, first));
            }
            Event::End(TagEnd::List { .. }) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                self.item_depth += 1;
                let kind = match self.lists.last_mut() {
                    Some((ordered, next)) => {
                        let index = *next;
                        *next = next.saturating_add(1);
                        BlockKind::ListItem {
                            ordered: *ordered,
                            index,
                        }
                    }
                    None => BlockKind::bullet(),
                };
                self.current = Some(Block::new(kind));
            }
            Event::End(TagEnd::Item) => {
                self.flush();
                self.item_depth = self.item_depth.saturating_sub(1);
            }
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::InlineHtml(html) => {
                if !self.inline_tag(&html) {
                    self.text(&html);
                }
            }
            Event::Html(html) => self.text(html.trim_end()),
            Event::Text(text) | Event::Code(text) => {
                let text = text.trim_end_matches('\n').replace('\n', " ");
                self.text(&text);
            }
            Event::SoftBreak | Event::HardBreak => self.text(" "),
            _ => {}
        }
    }

    fn inline_tag(&mut self, html: &str) -> bool {
        let counter = match html.trim().to_ascii_lowercase().as_str() {
            "<u>" | "<ins>" => (&mut self.underline, true),
            "</u>" | "</ins>" => (&mut self.underline, false),
            "<b>" | "<strong>" => (&mut self.bold, true),
            "</b>" | "</strong>" => (&mut self.bold, false),
            "<i>" | "<em>" => (&mut self.italic, true),
            "</i>" | "</em>" => (&mut self.italic, false),
            _ => return false,
        };
        match counter {
            (depth, true) => *depth += 1,
            (depth, false) => *depth = depth.saturating_sub(1),
        }
        true
    }

    fn formats(&self) -> FormatSet {
        let mut formats = FormatSet::new();
        if self.bold > 0 {
            formats.insert(Format::Bold);
        }
        if self.italic > 0 {
            formats.insert(Format::Italic);
        }
        if self.underline > 0 {
            formats.insert(Format::Underline);
        }
        formats
    }

    fn context_kind(&self) -> BlockKind {
        if self.quote_depth > 0 {
            BlockKind::Blockquote
        } else {
            BlockKind::Paragraph
        }
    }

    fn ensure_block(&mut self) {
        if self.current.is_none() {
            self.current = Some(Block::new(self.context_kind()));
        }
    }

    fn text(&mut self, text: &str) {
        self.ensure_block();
        let formats = self.formats();
        if let Some(block) = self.current.as_mut() {
            block.push_text(text, &formats);
        }
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            block.normalize();
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Document {
        self.flush();
        Document::from_blocks(self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_blocks(vec![
            Block::with_runs(BlockKind::Heading1, vec![Run::styled("Groceries", &[Format::Bold])]),
            Block::with_runs(
                BlockKind::Paragraph,
                vec![
                    Run::plain("Buy "),
                    Run::styled("fresh", &[Format::Italic]),
                    Run::plain(" and "),
                    Run::styled("cheap", &[Format::Underline]),
                    Run::plain(" food"),
                ],
            ),
            Block::with_runs(BlockKind::ordered(1), vec![Run::plain("eggs")]),
            Block::with_runs(BlockKind::ordered(2), vec![Run::plain("milk")]),
            Block::with_runs(BlockKind::Blockquote, vec![Run::styled("eat well", &[Format::Italic])]),
            Block::with_runs(BlockKind::bullet(), vec![Run::plain("done")]),
        ])
    }

    #[test]
    fn writes_stable_markdown() {
        let md = to_markdown(&sample());
        assert_eq!(
            md,
            "# **Groceries**\n\n\
             Buy *fresh* and <u>cheap</u> food\n\n\
             1. eggs\n\
             2. milk\n\n\
             > *eat well*\n\n\
             - done"
        );
    }

    #[test]
    fn reads_back_what_it_writes() {
        let doc = sample();
        assert_eq!(from_markdown(&to_markdown(&doc)), doc);
    }

    #[test]
    fn literal_markers_survive_as_text() {
        let doc = Document::from_plain_text("- not a list\n2. not numbered\n# no heading\na*b_c");
        let md = to_markdown(&doc);
        let back = from_markdown(&md);
        assert_eq!(back.plain_text(), doc.plain_text());
        assert!(back.blocks().iter().all(|b| b.kind == BlockKind::Paragraph));
    }

    #[test]
    fn edge_spaces_keep_their_formatting() {
        let doc = Document::from_blocks(vec![Block::with_runs(
            BlockKind::Paragraph,
            vec![Run::styled("hello ", &[Format::Bold]), Run::plain("world")],
        )]);
        assert_eq!(to_markdown(&doc), "<b>hello </b>world");
        round_trips(&doc);
    }

    #[test]
    fn empty_document_is_empty_string() {
        assert_eq!(to_markdown(&Document::new()), "");
        assert!(from_markdown("").is_empty());
    }

    #[test]
    fn reads_foreign_markdown() {
        let doc = from_markdown("### Deep\n\nSome `code` and [a link](http://x).\n\n3. three\n4. four");
        assert_eq!(doc.blocks()[0].kind, BlockKind::Heading2);
        assert_eq!(doc.blocks()[1].text(), "Some code and a link.");
        assert_eq!(doc.blocks()[2].kind, BlockKind::ordered(3));
        assert_eq!(doc.blocks()[3].kind, BlockKind::ordered(4));
    }

    fn round_trips(doc: &Document) {
        let md = to_markdown(doc);
        assert_eq!(&from_markdown(&md), doc, "markdown was {:?}", md);
    }

    fn paragraph(runs: Vec<Run>) -> Document {
        Document::from_blocks(vec![Block::with_runs(BlockKind::Paragraph, runs)])
    }

    #[test]
    fn punctuation_at_run_edges_survives() {
        let italic_dot = paragraph(vec![Run::styled("x.", &[Format::Italic]), Run::plain("y")]);
        assert_eq!(to_markdown(&italic_dot), "<i>x.</i>y");
        round_trips(&italic_dot);

        round_trips(&paragraph(vec![Run::plain("a"), Run::styled("(b)", &[Format::Bold])]));
        round_trips(&paragraph(vec![
            Run::styled("wow!", &[Format::Bold, Format::Italic]),
            Run::plain("ok"),
        ]));
        round_trips(&paragraph(vec![
            Run::plain("say \""),
            Run::styled("\"hi\"", &[Format::Underline, Format::Bold]),
            Run::plain(" now"),
        ]));
    }

    #[test]
    fn adjacent_formatted_runs_survive() {
        round_trips(&paragraph(vec![
            Run::plain("a"),
            Run::styled("b", &[Format::Italic]),
            Run::styled("c", &[Format::Bold]),
            Run::styled("d", &[Format::Bold, Format::Underline]),
            Run::plain("e"),
        ]));
        round_trips(&paragraph(vec![
            Run::styled("one ", &[Format::Bold]),
            Run::styled("two", &[Format::Italic]),
        ]));
    }

    #[test]
    fn indented_markers_stay_text() {
        let doc = Document::from_plain_text("  - eggs\n  - milk\n   2. two\n    # not code");
        let md = to_markdown(&doc);
        assert!(md.starts_with("&#32;&#32;\\- eggs"), "{}", md);
        round_trips(&doc);
        assert!(from_markdown(&md)
            .blocks()
            .iter()
            .all(|b| b.kind == BlockKind::Paragraph));
    }

    #[test]
    fn edge_whitespace_is_kept() {
        round_trips(&paragraph(vec![Run::plain("\tindented  ")]));
        round_trips(&Document::from_blocks(vec![Block::with_runs(
            BlockKind::bullet(),
            vec![Run::plain("  spaced item")],
        )]));
    }

    #[test]
    fn heading_closing_hashes_stay_text() {
        round_trips(&Document::from_blocks(vec![Block::with_runs(
            BlockKind::Heading2,
            vec![Run::styled("issue #", &[Format::Bold])],
        )]));
    }

    #[test]
    fn reads_html_inline_formatting() {
        let doc = from_markdown("<b>strong</b> and <i>slanted</i>");
        assert_eq!(
            doc.blocks()[0].runs,
            vec![
                Run::styled("strong", &[Format::Bold]),
                Run::plain(" and "),
                Run::styled("slanted", &[Format::Italic]),
            ]
        );
    }
}
