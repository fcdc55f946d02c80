//! Markdown rendering with comrak.

use std::collections::HashMap;

use anyhow::Result;
use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{
    Document, HeadingRef, InlineSpan, InlineStyle, LineType, RenderedDocument, RenderedLine,
};
use crate::toc::slugify;

const CODE_RIGHT_PADDING: usize = 1;

/// Layout options for the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Preview width in columns
    pub width: u16,
    pub table_zebra_stripes: bool,
    /// Mark column alignment in the header separator
    pub table_alignment_indicators: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            table_zebra_stripes: false,
            table_alignment_indicators: true,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub const fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }
}

impl Document {
    /// Parse markdown source into a Document.
    ///
    /// # Example
    ///
    /// ```
    /// use marksync::document::Document;
    ///
    /// let doc = Document::parse("# Hello\n\nWorld").unwrap();
    /// assert_eq!(doc.headings()[0].id, "hello");
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        parse(source, &RenderOptions::default())
    }

    pub fn parse_with_layout(source: &str, width: u16) -> Result<Self> {
        parse(source, &RenderOptions::default().with_width(width))
    }
}

/// Render markdown source into preview rows.
pub fn parse(source: &str, options: &RenderOptions) -> Result<Document> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &create_options());

    let mut renderer = Renderer::new(options);
    renderer.block(root, 0, None);
    while matches!(
        renderer.out.lines.last().map(RenderedLine::line_type),
        Some(LineType::Empty)
    ) {
        renderer.out.lines.pop();
    }
    tracing::debug!(
        rows = renderer.out.lines.len(),
        headings = renderer.out.headings.len(),
        width = options.width,
        "document rendered"
    );
    Ok(Document::from_rendered(
        source.to_string(),
        options.width,
        renderer.out,
    ))
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}

struct Renderer<'o> {
    options: &'o RenderOptions,
    wrap_width: usize,
    out: RenderedDocument,
    /// Times each base slug has been handed out
    slug_counts: HashMap<String, usize>,
}

impl<'o> Renderer<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            wrap_width: usize::from(options.width.max(1)),
            out: RenderedDocument::default(),
            slug_counts: HashMap::new(),
        }
    }

    fn push(&mut self, line: RenderedLine) {
        self.out.lines.push(line);
    }

    fn blank(&mut self) {
        self.push(RenderedLine::new(String::new(), LineType::Empty));
    }

    /// Push wrapped rows, tagging the first with `source_line`.
    fn push_wrapped(&mut self, rows: Vec<Vec<InlineSpan>>, line_type: LineType, source_line: usize) {
        for (idx, spans) in rows.into_iter().enumerate() {
            let content = spans_to_string(&spans);
            let line = RenderedLine::with_spans(content, line_type, spans);
            self.push(if idx == 0 {
                line.with_source_line(source_line)
            } else {
                line
            });
        }
    }

    /// GitHub-style anchor: the slug, then `-1`, `-2`, ... for repeats.
    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.slug_counts.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        // A generated suffix may collide with a literal heading of that name.
        if id != base {
            self.slug_counts.entry(id.clone()).or_insert(1);
        }
        id
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, list_marker: Option<&str>) {
        let source_line = node.data.borrow().sourcepos.start.line;
        match &node.data.borrow().value {
            NodeValue::Document => {
                for child in node.children() {
                    self.block(child, depth, None);
                }
            }

            NodeValue::Heading(heading) => {
                let text = extract_text(node).trim().to_string();
                ensure_trailing_empty_lines(&mut self.out.lines, 1);
                let line = self.out.lines.len();
                let id = self.unique_id(&text);
                self.out.headings.push(HeadingRef {
                    level: heading.level,
                    text: text.clone(),
                    id,
                    line,
                    source_line,
                });
                let style = InlineStyle {
                    strong: true,
                    ..InlineStyle::default()
                };
                let spans = vec![InlineSpan::new(text, style)];
                let rows = wrap_spans(&spans, self.wrap_width, "", "");
                self.push_wrapped(rows, LineType::Heading(heading.level), source_line);
                self.blank();
            }

            NodeValue::Paragraph => {
                let spans = collect_inline_spans(node);
                let rows = wrap_spans(&spans, self.wrap_width, "", "");
                self.push_wrapped(rows, LineType::Paragraph, source_line);
                self.blank();
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .unwrap_or("code")
                    .to_string();
                let literal = code_block.literal.clone();
                self.code_block(&language, &literal, source_line);
                self.blank();
            }

            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let count = node.children().count();
                let number_width = (list.start + count.saturating_sub(1)).to_string().len();
                for (index, child) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => {
                            format!("{:>number_width$}{delimiter} ", list.start + index)
                        }
                    };
                    self.block(child, depth + 1, Some(&marker));
                }
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::Item(_) | NodeValue::TaskItem(_) => {
                self.list_item(node, depth, list_marker.unwrap_or("• "), source_line);
            }

            NodeValue::BlockQuote => {
                self.blockquote(node, 1);
                self.blank();
            }

            NodeValue::ThematicBreak => {
                self.push(
                    RenderedLine::new("─".repeat(self.wrap_width), LineType::HorizontalRule)
                        .with_source_line(source_line),
                );
                self.blank();
            }

            NodeValue::Table(_) => {
                self.table(node, source_line);
                self.blank();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.width());
                let spans = collect_inline_spans(node);
                let rows = wrap_spans(&spans, self.wrap_width, &label, &continuation);
                self.push_wrapped(rows, LineType::Paragraph, source_line);
                self.blank();
            }

            NodeValue::HtmlBlock(html) => {
                let literal = html.literal.clone();
                for (idx, raw) in literal.lines().enumerate() {
                    let line = RenderedLine::new(truncate_text(raw, self.wrap_width), LineType::Paragraph);
                    self.push(if idx == 0 {
                        line.with_source_line(source_line)
                    } else {
                        line
                    });
                }
                self.blank();
            }

            _ => {
                for child in node.children() {
                    self.block(child, depth, list_marker);
                }
            }
        }
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: &str, source_line: usize) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let marker = match &node.data.borrow().value {
            NodeValue::TaskItem(symbol) => {
                if symbol.is_some() {
                    "✓ ".to_string()
                } else {
                    "□ ".to_string()
                }
            }
            _ => marker.to_string(),
        };
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(marker.width()));
        let mut rendered_any = false;

        for child in node.children() {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_paragraph {
                if rendered_any {
                    self.push(RenderedLine::new(String::new(), LineType::ListItem(depth)));
                }
                let spans = collect_inline_spans(child);
                let prefix = if rendered_any { &prefix_next } else { &prefix_first };
                let rows = wrap_spans(&spans, self.wrap_width, prefix, &prefix_next);
                let line = child.data.borrow().sourcepos.start.line;
                self.push_wrapped(rows, LineType::ListItem(depth), line);
                rendered_any = true;
            } else {
                self.block(child, depth, None);
            }
        }

        if !rendered_any {
            let rows = wrap_spans(&[], self.wrap_width, &prefix_first, &prefix_next);
            self.push_wrapped(rows, LineType::ListItem(depth), source_line);
        }
    }

    fn blockquote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = "│ ".repeat(quote_depth);
        for child in node.children() {
            let line = child.data.borrow().sourcepos.start.line;
            let nested = matches!(child.data.borrow().value, NodeValue::BlockQuote);
            if nested {
                self.blockquote(child, quote_depth + 1);
                continue;
            }
            let spans = match &child.data.borrow().value {
                NodeValue::Paragraph => collect_inline_spans(child),
                _ => vec![InlineSpan::new(
                    extract_text(child).replace('\n', " "),
                    InlineStyle::default(),
                )],
            };
            let rows = wrap_spans(&spans, self.wrap_width, &prefix, &prefix);
            self.push_wrapped(rows, LineType::BlockQuote, line);
        }
    }

    fn code_block(&mut self, language: &str, literal: &str, source_line: usize) {
        let content_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(self.wrap_width.saturating_sub(4 + CODE_RIGHT_PADDING).max(1));
        let inner = content_width + 2 + CODE_RIGHT_PADDING;
        let label = truncate_text(&format!(" {language} "), inner);
        let top = format!("┌{label}{}┐", "─".repeat(inner.saturating_sub(label.width())));
        self.push(RenderedLine::new(top, LineType::CodeBlock).with_source_line(source_line));

        let code_style = InlineStyle {
            code: true,
            ..InlineStyle::default()
        };
        for raw in literal.lines() {
            let text = truncate_text(raw, content_width);
            let padding = " ".repeat(content_width.saturating_sub(text.width()) + CODE_RIGHT_PADDING);
            let spans = vec![
                InlineSpan::new("│ ".to_string(), InlineStyle::default()),
                InlineSpan::new(text, code_style),
                InlineSpan::new(format!("{padding} │"), InlineStyle::default()),
            ];
            let content = spans_to_string(&spans);
            self.push(RenderedLine::with_spans(content, LineType::CodeBlock, spans));
        }

        self.push(RenderedLine::new(
            format!("└{}┘", "─".repeat(inner)),
            LineType::CodeBlock,
        ));
    }

    fn table<'a>(&mut self, node: &'a AstNode<'a>, source_line: usize) {
        let (alignments, mut rows, has_header) = collect_table_rows(node);
        let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if num_cols == 0 {
            return;
        }
        for row in &mut rows {
            row.resize(num_cols, String::new());
        }

        let mut widths = vec![1_usize; num_cols];
        for row in &rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.width());
            }
        }
        // Row width is 1 + sum(width + 3).
        let max_width = self.wrap_width.max(4);
        while 1 + widths.iter().sum::<usize>() + 3 * num_cols > max_width {
            let Some((widest, _)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widths[widest] <= 1 {
                break;
            }
            widths[widest] -= 1;
        }

        let border = LineType::Table { striped: false };
        self.push(
            RenderedLine::new(table_border(&widths, '┌', '┬', '┐', None), border)
                .with_source_line(source_line),
        );
        let mut body_index = 0usize;
        for (idx, row) in rows.iter().enumerate() {
            let header = has_header && idx == 0;
            let line_type = if header {
                LineType::TableHeader
            } else {
                let striped = self.options.table_zebra_stripes && body_index % 2 == 1;
                body_index += 1;
                LineType::Table { striped }
            };
            self.push(RenderedLine::new(table_row(row, &widths, &alignments), line_type));
            if header {
                let marks = self
                    .options
                    .table_alignment_indicators
                    .then_some(alignments.as_slice());
                self.push(RenderedLine::new(table_border(&widths, '├', '┼', '┤', marks), border));
            }
        }
        self.push(RenderedLine::new(table_border(&widths, '└', '┴', '┘', None), border));
    }
}

fn ensure_trailing_empty_lines(lines: &mut Vec<RenderedLine>, count: usize) {
    if lines.is_empty() {
        return;
    }
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| matches!(line.line_type(), LineType::Empty))
        .count();
    for _ in existing..count {
        lines.push(RenderedLine::new(String::new(), LineType::Empty));
    }
}

fn collect_table_rows<'a>(node: &'a AstNode<'a>) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };
    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in node.children() {
        let NodeValue::TableRow(header) = row_node.data.borrow().value else {
            continue;
        };
        has_header |= header;
        let cells = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| extract_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        rows.push(cells);
    }
    (alignments, rows, has_header)
}

/// Horizontal table border. With `alignments`, `:` marks the aligned side(s)
/// of each column, as in the markdown delimiter row.
fn table_border(
    widths: &[usize],
    left: char,
    middle: char,
    right: char,
    alignments: Option<&[TableAlignment]>,
) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in widths.iter().enumerate() {
        let alignment = alignments
            .and_then(|a| a.get(idx).copied())
            .unwrap_or(TableAlignment::None);
        let (start, end) = match alignment {
            TableAlignment::Left => (':', '─'),
            TableAlignment::Right => ('─', ':'),
            TableAlignment::Center => (':', ':'),
            TableAlignment::None => ('─', '─'),
        };
        out.push(start);
        out.push_str(&"─".repeat(*width));
        out.push(end);
        if idx + 1 < widths.len() {
            out.push(middle);
        }
    }
    out.push(right);
    out
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, width) in widths.iter().enumerate() {
        let content = truncate_text(cells.get(idx).map_or("", String::as_str), *width);
        let padding = width.saturating_sub(content.width());
        out.push(' ');
        match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => {
                out.push_str(&" ".repeat(padding));
                out.push_str(&content);
            }
            TableAlignment::Center => {
                let left = padding / 2;
                out.push_str(&" ".repeat(left));
                out.push_str(&content);
                out.push_str(&" ".repeat(padding - left));
            }
            TableAlignment::Left | TableAlignment::None => {
                out.push_str(&content);
                out.push_str(&" ".repeat(padding));
            }
        }
        out.push_str(" │");
    }
    out
}

/// Longest prefix of `text` that fits in `max_width` columns.
pub(crate) fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => text.push_str(&c.literal),
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let mut next = style;
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) => return,
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
            return;
        }
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
            return;
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[image: {label}]"), style));
            return;
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
            return;
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
            return;
        }
        NodeValue::Emph => next.emphasis = true,
        NodeValue::Strong => next.strong = true,
        NodeValue::Strikethrough => next.strikethrough = true,
        NodeValue::Link(_) => next.link = true,
        _ => {}
    }
    for child in node.children() {
        collect_inline_spans_recursive(child, next, spans);
    }
}

/// Word-wrap spans into rows of at most `width` columns.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let tokens: Vec<InlineSpan> = spans.iter().flat_map(split_inline_tokens).collect();

    let mut rows: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_width = 0usize;
    let mut has_word = false;

    let start_row = |prefix: &str, current: &mut Vec<InlineSpan>, current_width: &mut usize| {
        current.clear();
        *current_width = prefix.width();
        if !prefix.is_empty() {
            current.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
        }
    };
    start_row(prefix_first, &mut current, &mut current_width);

    for token in tokens {
        let token_width = token.text().width();
        let is_ws = token.text().chars().all(char::is_whitespace);

        if current_width + token_width > width && has_word {
            rows.push(std::mem::take(&mut current));
            start_row(prefix_next, &mut current, &mut current_width);
            has_word = false;
        }
        // Leading whitespace on a wrapped row is dropped.
        if is_ws && !has_word {
            continue;
        }
        current_width += token_width;
        current.push(token);
        has_word = true;
    }

    rows.push(current);
    rows
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_ws: Option<bool> = None;
    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if in_ws.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        in_ws = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(doc: &Document) -> Vec<&str> {
        doc.lines().iter().map(RenderedLine::content).collect()
    }

    #[test]
    fn test_heading_ids_and_rows() {
        let doc = Document::parse("# Title\n\nIntro text.\n\n## Getting Started\n\nMore.").unwrap();
        let headings = doc.headings();
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].id, "title");
        assert_eq!(headings[0].line, 0);
        assert_eq!(headings[0].source_line, 1);
        assert_eq!(headings[1].id, "getting-started");
        assert_eq!(headings[1].source_line, 5);
        assert_eq!(doc.line_at(headings[1].line).unwrap().content(), "Getting Started");
    }

    #[test]
    fn test_plain_text_has_one_line_per_row() {
        let doc = Document::parse("# Title\n\n- one\n- two").unwrap();
        let text = doc.to_plain_text();
        assert_eq!(text.lines().count(), doc.line_count());
        assert!(text.starts_with("Title\n"));
        assert!(text.contains("• two"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn test_duplicate_heading_ids_get_suffixes() {
        let doc = Document::parse("# Notes\n\n## Notes\n\n### Notes\n\n## Notes 1").unwrap();
        let ids: Vec<&str> = doc.headings().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["notes", "notes-1", "notes-2", "notes-1-1"]);
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let doc = Document::parse_with_layout("one two three four five six", 10).unwrap();
        let rows = contents(&doc);
        assert!(rows.len() >= 3);
        assert!(rows.iter().all(|r| r.width() <= 10));
        assert_eq!(doc.line_at(0).unwrap().source_line(), Some(1));
    }

    #[test]
    fn test_wide_characters_wrap_by_display_width() {
        let doc = Document::parse_with_layout("日本語 日本語 日本語", 8).unwrap();
        assert!(contents(&doc).iter().all(|r| r.width() <= 8));
    }

    #[test]
    fn test_lists_and_tasks() {
        let doc = Document::parse("- one\n- two\n\n1. first\n2. second\n\n- [x] done\n- [ ] todo").unwrap();
        let rows = contents(&doc);
        assert!(rows.contains(&"• one"));
        assert!(rows.contains(&"1. first"));
        assert!(rows.contains(&"✓ done"));
        assert!(rows.contains(&"□ todo"));
    }

    #[test]
    fn test_code_block_is_framed() {
        let doc = Document::parse("```rust\nfn main() {}\n```").unwrap();
        let rows = contents(&doc);
        assert!(rows[0].starts_with("┌ rust "));
        assert!(rows[1].contains("fn main() {}"));
        assert!(rows[2].starts_with('└'));
    }

    #[test]
    fn test_table_alignment_indicators_and_zebra() {
        let src = "| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 | 4 |\n| 5 | 6 |";
        let options = RenderOptions {
            table_zebra_stripes: true,
            ..RenderOptions::default()
        };
        let doc = parse(src, &options).unwrap();
        let rows = contents(&doc);
        assert_eq!(rows[2], "├:──┼──:┤");
        let striped: Vec<bool> = doc
            .lines()
            .iter()
            .filter_map(|l| match l.line_type() {
                LineType::Table { striped } if l.content().starts_with('│') => Some(*striped),
                _ => None,
            })
            .collect();
        assert_eq!(striped, vec![false, true, false]);

        let plain = parse(
            src,
            &RenderOptions {
                table_alignment_indicators: false,
                ..RenderOptions::default()
            },
        )
        .unwrap();
        assert_eq!(contents(&plain)[2], "├───┼───┤");
    }

    #[test]
    fn test_blockquote_and_rule() {
        let doc = Document::parse_with_layout("> quoted\n\n---", 20).unwrap();
        let rows = contents(&doc);
        assert_eq!(rows[0], "│ quoted");
        assert_eq!(rows[2], "─".repeat(20));
    }

    #[test]
    fn test_no_trailing_blank_rows() {
        let doc = Document::parse("Hello").unwrap();
        assert_eq!(contents(&doc), vec!["Hello"]);
    }

    #[test]
    fn test_empty_source() {
        let doc = Document::parse("").unwrap();
        assert_eq!(doc.line_count(), 0);
        assert!(doc.headings().is_empty());
    }
}
