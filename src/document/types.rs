//! Core document types.

use crate::toc::{self, slugify};

/// Result of rendering markdown, ready to be assembled into a `Document`.
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderedDocument {
    pub lines: Vec<RenderedLine>,
    pub headings: Vec<HeadingRef>,
}

/// A parsed and rendered markdown document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original source text
    source: String,
    /// Rendered preview rows
    lines: Vec<RenderedLine>,
    /// Heading references for the TOC
    headings: Vec<HeadingRef>,
    /// Width the preview was laid out for
    width: u16,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            lines: Vec::new(),
            headings: Vec::new(),
            width: 0,
        }
    }

    pub(crate) fn from_rendered(source: String, width: u16, rendered: RenderedDocument) -> Self {
        Self {
            source,
            lines: rendered.lines,
            headings: rendered.headings,
            width,
        }
    }

    /// Get the total number of rendered rows.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    /// Get all headings for the TOC, in document order.
    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    /// Headings in the form the TOC state consumes.
    pub fn toc_headings(&self) -> Vec<toc::Heading> {
        self.headings
            .iter()
            .map(|h| toc::Heading {
                id: h.id.clone(),
                text: h.text.clone(),
                level: h.level,
                slug: slugify(&h.text),
            })
            .collect()
    }

    /// Rendered row of the heading with `id`.
    pub fn heading_line(&self, id: &str) -> Option<usize> {
        self.headings.iter().find(|h| h.id == id).map(|h| h.line)
    }

    /// Get visible lines for rendering.
    ///
    /// Returns lines from `offset` to `offset + count`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// Get a specific rendered line by index.
    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// Rendered preview as plain text, one row per line.
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line.content().trim_end());
            text.push('\n');
        }
        text
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// A single rendered row with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    content: String,
    line_type: LineType,
    /// 1-based source line of the block that starts on this row
    source_line: Option<usize>,
    spans: Vec<InlineSpan>,
}

impl RenderedLine {
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            source_line: None,
            spans: Vec::new(),
        }
    }

    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            source_line: None,
            spans,
        }
    }

    #[must_use]
    pub const fn with_source_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    pub const fn source_line(&self) -> Option<usize> {
        self.source_line
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    TableHeader,
    /// Table body row or border; `striped` marks alternate body rows
    Table { striped: bool },
    HorizontalRule,
    Empty,
}

/// Reference to a heading in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text (plain, no formatting)
    pub text: String,
    /// Anchor id, unique within the document
    pub id: String,
    /// Row in the rendered preview
    pub line: usize,
    /// 1-based line in the source
    pub source_line: usize,
}

