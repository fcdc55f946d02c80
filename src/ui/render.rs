use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::app::{Focus, Model};
use crate::document::LineType;

use super::{PREVIEW_LEFT_PADDING, TOC_WIDTH_PERCENT, overlays, status, style};

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub toc: Option<Rect>,
    pub source: Rect,
    pub preview: Rect,
    pub status: Rect,
}

/// Split the terminal into TOC sidebar, source, preview and status bar.
pub fn split_areas(area: Rect, toc_visible: bool) -> Areas {
    let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    let (toc, body) = if toc_visible {
        let cols = Layout::horizontal([
            Constraint::Percentage(TOC_WIDTH_PERCENT),
            Constraint::Percentage(100 - TOC_WIDTH_PERCENT),
        ])
        .split(rows[0]);
        (Some(cols[0]), cols[1])
    } else {
        (None, rows[0])
    };
    let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(body);
    Areas {
        toc,
        source: panes[0],
        preview: panes[1],
        status: rows[1],
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            style::focused_border_style()
        } else {
            Style::default()
        })
}

/// Text area of the source pane.
pub fn source_text_area(area: Rect) -> Rect {
    pane_block("", false).inner(area)
}

/// Text area of the preview pane, inside its border and left padding.
pub fn preview_text_area(area: Rect) -> Rect {
    pane_block("", false)
        .padding(Padding::left(PREVIEW_LEFT_PADDING))
        .inner(area)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let areas = split_areas(area, model.toc_visible);

    if let Some(toc_area) = areas.toc {
        render_toc(model, frame, toc_area);
    }
    render_source(model, frame, areas.source);
    render_preview(model, frame, areas.preview);
    status::render_status_bar(model, frame, areas.status);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_toc(model: &Model, frame: &mut Frame, area: Rect) {
    let headings = model.session.headings();
    let active = model.session.active_heading();
    let visible_rows = area.height.saturating_sub(2) as usize;
    let max_start = headings.len().saturating_sub(visible_rows);
    let start = model.toc_scroll_offset.min(max_start);

    let items: Vec<Line> = headings
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_rows)
        .map(|(i, h)| {
            let indent = "  ".repeat(h.level.saturating_sub(1) as usize);
            let is_active = active == Some(h.id.as_str());
            let marker = if is_active { "▸" } else { " " };
            let mut line_style = if is_active {
                style::active_heading_style(model.light)
            } else {
                style::style_for_line_type(&LineType::Heading(h.level), model.light)
                    .remove_modifier(Modifier::UNDERLINED)
            };
            if model.focus == Focus::Toc && model.toc_selected == Some(i) {
                line_style = line_style.reversed();
            }
            Line::styled(format!("{marker}{indent} {}", h.text), line_style)
        })
        .collect();

    let toc = Paragraph::new(items).block(pane_block("Contents", model.focus == Focus::Toc));
    frame.render_widget(toc, area);
}

fn render_source(model: &Model, frame: &mut Frame, area: Rect) {
    let pane = model.source_pane.borrow();
    let layout = &model.source_layout;
    let gutter = style::gutter_style(model.light);

    let mut in_fence = fence_state_before(layout.rows(), pane.visible_range().start);
    let mut content: Vec<Line> = Vec::with_capacity(pane.height() as usize);
    for row in layout.rows().get(pane.visible_range()).unwrap_or_default() {
        let fence_marker = !row.continuation && is_fence(&row.text);
        let text_style = style::style_for_source(&row.text, in_fence, model.light);
        if fence_marker {
            in_fence = !in_fence;
        }
        let mut spans = Vec::with_capacity(2);
        if layout.gutter_width() > 0 {
            spans.push(Span::styled(layout.gutter(row), gutter));
        }
        spans.push(Span::styled(row.text.clone(), text_style));
        content.push(Line::from(spans));
    }

    let title = model
        .file_path
        .file_name()
        .map_or_else(|| "source".to_string(), |n| n.to_string_lossy().to_string());
    let source = Paragraph::new(content).block(pane_block(&title, model.focus == Focus::Source));
    frame.render_widget(source, area);
}

fn is_fence(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Whether the first visible row sits inside a fenced code block.
fn fence_state_before(rows: &[crate::document::SourceRow], start: usize) -> bool {
    rows[..start.min(rows.len())]
        .iter()
        .filter(|row| !row.continuation && is_fence(&row.text))
        .count()
        % 2
        == 1
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let pane = model.preview_pane.borrow();
    let visible = pane.visible_range();
    let lines = model.document.visible_lines(visible.start, visible.len());

    let content: Vec<Line> = lines
        .iter()
        .map(|line| {
            let line_style = style::style_for_line_type(line.line_type(), model.light);
            line.spans().map_or_else(
                || Line::from(Span::styled(line.content().to_string(), line_style)),
                |spans| {
                    Line::from(
                        spans
                            .iter()
                            .map(|span| {
                                Span::styled(
                                    span.text().to_string(),
                                    style::style_for_inline(line_style, span.style(), model.light),
                                )
                            })
                            .collect::<Vec<_>>(),
                    )
                    .style(line_style)
                },
            )
        })
        .collect();

    let block = pane_block("Preview", model.focus == Focus::Preview)
        .padding(Padding::left(PREVIEW_LEFT_PADDING));
    let preview = Paragraph::new(content).block(block);
    frame.render_widget(preview, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceLayout;

    #[test]
    fn test_split_without_toc_halves_body() {
        let areas = split_areas(Rect::new(0, 0, 100, 30), false);
        assert!(areas.toc.is_none());
        assert_eq!(areas.source.width, 50);
        assert_eq!(areas.preview.x, 50);
        assert_eq!(areas.status, Rect::new(0, 29, 100, 1));
    }

    #[test]
    fn test_split_with_toc_reserves_sidebar() {
        let areas = split_areas(Rect::new(0, 0, 100, 30), true);
        let toc = areas.toc.unwrap();
        assert_eq!(toc.width, 25);
        assert_eq!(areas.source.x, 25);
        assert_eq!(areas.source.height, 29);
    }

    #[test]
    fn test_text_areas_exclude_chrome() {
        let pane = Rect::new(0, 0, 40, 20);
        assert_eq!(source_text_area(pane), Rect::new(1, 1, 38, 18));
        assert_eq!(preview_text_area(pane), Rect::new(2, 1, 37, 18));
    }

    #[test]
    fn test_fence_state_tracks_open_blocks() {
        let layout = SourceLayout::new("text\n```rust\nlet a = 1;\n```\nafter", 40, false, false);
        assert!(!fence_state_before(layout.rows(), 1));
        assert!(fence_state_before(layout.rows(), 2));
        assert!(!fence_state_before(layout.rows(), 4));
    }
}
