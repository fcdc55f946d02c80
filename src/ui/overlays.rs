use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

const KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Scrolling",
        &[
            ("j/k or Up/Down", "Scroll focused pane"),
            ("Space/PageDown", "Page down"),
            ("b/PageUp", "Page up"),
            ("Ctrl-d / Ctrl-u", "Half page"),
            ("g / G", "Top / bottom"),
            ("Mouse wheel", "Scroll pane under cursor"),
        ],
    ),
    (
        "Contents",
        &[
            ("t", "Toggle sidebar"),
            ("Tab", "Cycle focus"),
            ("Enter", "Jump to selected heading"),
        ],
    ),
    (
        "Settings",
        &[
            ("s", "Toggle scroll sync"),
            ("w", "Toggle word wrap"),
            ("n", "Toggle line numbers"),
            ("T", "Cycle theme (light, dark, system)"),
        ],
    ),
    (
        "Other",
        &[
            ("r", "Reload file"),
            ("e", "Export preview as text"),
            ("?", "Toggle help"),
            ("q / Ctrl-c", "Quit"),
        ],
    ),
];

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(52, 26, area);
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (section, keys) in KEYS {
        lines.push(Line::styled(*section, section_style));
        for (key, action) in *keys {
            lines.push(Line::raw(format!("  {key:<18}{action}")));
        }
        lines.push(Line::raw(""));
    }
    let settings = model
        .settings_path
        .as_ref()
        .map_or_else(|| "<not saved>".to_string(), |p| p.display().to_string());
    lines.push(Line::styled("Settings file", section_style));
    lines.push(Line::raw(format!("  {settings}")));

    let help = Paragraph::new(lines).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .style(Style::default().bg(Color::Black).fg(Color::White)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(help, popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
