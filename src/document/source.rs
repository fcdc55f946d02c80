//! Layout of the raw source pane.

use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

/// One screen row of the source pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 0-based source line this row belongs to
    pub line: usize,
    pub text: String,
    /// True for the second and later rows of a wrapped line
    pub continuation: bool,
}

/// Source text split into rows for a given width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLayout {
    rows: Vec<SourceRow>,
    line_count: usize,
    gutter_width: usize,
}

impl SourceLayout {
    /// Lay out `source` for a pane `width` columns wide, including the
    /// line-number gutter when `line_numbers` is set.
    pub fn new(source: &str, width: u16, wrap: bool, line_numbers: bool) -> Self {
        let line_count = source.lines().count().max(1);
        let gutter_width = if line_numbers {
            line_count.to_string().len() + 1
        } else {
            0
        };
        let text_width = usize::from(width).saturating_sub(gutter_width).max(1);

        let mut rows = Vec::with_capacity(line_count);
        for (line, raw) in source.lines().enumerate() {
            let expanded = raw.replace('\t', &" ".repeat(TAB_WIDTH));
            if wrap {
                for (idx, text) in wrap_line(&expanded, text_width).into_iter().enumerate() {
                    rows.push(SourceRow {
                        line,
                        text,
                        continuation: idx > 0,
                    });
                }
            } else {
                rows.push(SourceRow {
                    line,
                    text: expanded,
                    continuation: false,
                });
            }
        }
        if rows.is_empty() {
            rows.push(SourceRow {
                line: 0,
                text: String::new(),
                continuation: false,
            });
        }

        Self {
            rows,
            line_count,
            gutter_width,
        }
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub const fn line_count(&self) -> usize {
        self.line_count
    }

    pub const fn gutter_width(&self) -> usize {
        self.gutter_width
    }

    /// First row of source line `line` (0-based).
    pub fn row_for_line(&self, line: usize) -> usize {
        self.rows.partition_point(|row| row.line < line)
    }

    pub fn line_for_row(&self, row: usize) -> usize {
        self.rows
            .get(row)
            .or_else(|| self.rows.last())
            .map_or(0, |r| r.line)
    }

    /// Gutter text for a row: the 1-based line number on a line's first row,
    /// blank on continuations.
    pub fn gutter(&self, row: &SourceRow) -> String {
        if self.gutter_width == 0 {
            return String::new();
        }
        if row.continuation {
            " ".repeat(self.gutter_width)
        } else {
            format!("{:>width$} ", row.line + 1, width = self.gutter_width - 1)
        }
    }
}

/// Split a line into chunks of at most `width` columns, breaking after
/// whitespace where possible.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    // Byte offset in `current` just past the last whitespace, and the width before it.
    let mut last_break: Option<(usize, usize)> = None;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > width && !current.is_empty() {
            match last_break {
                Some((at, at_width)) if at < current.len() => {
                    let rest = current.split_off(at);
                    out.push(std::mem::replace(&mut current, rest));
                    current_width -= at_width;
                }
                _ => {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
            }
            last_break = None;
        }
        current.push(ch);
        current_width += ch_width;
        if ch.is_whitespace() {
            last_break = Some((current.len(), current_width));
        }
    }
    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use unicode_width::UnicodeWidthStr;

    #[test]
    fn test_unwrapped_rows_match_lines() {
        let layout = SourceLayout::new("a\nb\n\nc", 2, false, false);
        assert_eq!(layout.row_count(), 4);
        assert_eq!(layout.rows()[3].text, "c");
    }

    #[test]
    fn test_wrap_breaks_after_whitespace() {
        let layout = SourceLayout::new("hello brave new world", 12, true, false);
        let rows: Vec<&str> = layout.rows().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(rows, vec!["hello brave ", "new world"]);
        assert!(layout.rows()[1].continuation);
        assert_eq!(layout.line_for_row(1), 0);
    }

    #[test]
    fn test_long_word_is_hard_broken() {
        let rows = wrap_line("abcdefghij", 4);
        assert_eq!(rows, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_gutter_numbers_first_rows_only() {
        let source = (1..=12).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let layout = SourceLayout::new(&source, 8, true, true);
        assert_eq!(layout.gutter_width(), 3);
        let first = &layout.rows()[0];
        assert_eq!(layout.gutter(first), " 1 ");
        let cont = layout.rows().iter().find(|r| r.continuation).unwrap();
        assert_eq!(layout.gutter(cont), "   ");
    }

    #[test]
    fn test_row_for_line() {
        let layout = SourceLayout::new("aaaa aaaa\nb\nc", 5, true, false);
        assert_eq!(layout.row_for_line(0), 0);
        assert_eq!(layout.row_for_line(1), 2);
        assert_eq!(layout.row_for_line(2), 3);
    }

    #[test]
    fn test_empty_source_has_one_row() {
        let layout = SourceLayout::new("", 10, true, true);
        assert_eq!(layout.row_count(), 1);
        assert_eq!(layout.line_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_wrapped_rows_fit_and_preserve_text(line in "[a-z ]{0,60}", width in 1usize..20) {
            let rows = wrap_line(&line, width);
            for row in &rows {
                prop_assert!(row.width() <= width);
            }
            prop_assert_eq!(rows.concat(), line);
        }
    }
}
