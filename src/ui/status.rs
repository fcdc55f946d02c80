use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Model;

use super::style;

/// Bottom bar: file name, sync state, both panes' scroll percentages and the
/// active heading. A pending status message replaces the hints.
pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(Paragraph::new(status_text(model)).style(style::status_style()), area);
}

pub fn status_text(model: &Model) -> String {
    let filename = model
        .file_path
        .file_name()
        .map_or_else(|| "untitled".to_string(), |s| s.to_string_lossy().to_string());
    let sync = if model.session.is_sync_enabled() {
        "sync:on"
    } else {
        "sync:off"
    };
    let source_percent = model.source_pane.borrow().scroll_percent();
    let preview_percent = model.preview_pane.borrow().scroll_percent();
    let heading = model
        .session
        .active_heading()
        .and_then(|id| model.session.headings().get(id))
        .map_or_else(String::new, |h| format!("  § {}", h.text));
    let watch = if model.watch_enabled { " [watching]" } else { "" };
    let tail = model.status_message().unwrap_or("?:help");

    format!(
        " {filename}  [{sync}]  src {source_percent}%  preview {preview_percent}%{heading}{watch}  {tail}"
    )
}
