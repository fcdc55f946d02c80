//! Colors for the preview, source pane and chrome.
//!
//! Everything uses ANSI or 256-color indices so the terminal palette stays
//! in charge. Light backgrounds swap to darker indices.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;
use crate::document::{InlineStyle, LineType};

/// Whether to use the light palette for `theme`. `System` reads the
/// terminal's `COLORFGBG` hint and falls back to dark.
pub fn is_light(theme: ThemeMode) -> bool {
    match theme {
        ThemeMode::Light => true,
        ThemeMode::Dark => false,
        ThemeMode::System => light_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()),
    }
}

fn light_from_colorfgbg(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    // "fg;bg" or "fg;default;bg"
    let bg = value.rsplit(';').next().unwrap_or(value);
    bg.parse::<u8>().is_ok_and(|bg| bg >= 7)
}

const fn pick(light: bool, on_light: Color, on_dark: Color) -> Color {
    if light { on_light } else { on_dark }
}

/// Style for a rendered preview row.
pub fn style_for_line_type(line_type: &LineType, light: bool) -> Style {
    match line_type {
        LineType::Heading(1) => Style::default()
            .fg(pick(light, Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(pick(light, Color::Indexed(22), Color::Green))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(pick(light, Color::Indexed(58), Color::Yellow))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(pick(light, Color::Indexed(54), Color::Magenta))
            .add_modifier(Modifier::BOLD),

        LineType::CodeBlock => Style::default()
            .fg(pick(light, Color::Indexed(238), Color::Indexed(245)))
            .add_modifier(Modifier::DIM),

        LineType::BlockQuote => Style::default()
            .fg(pick(light, Color::Indexed(24), Color::Blue))
            .add_modifier(Modifier::ITALIC),

        LineType::HorizontalRule => Style::default()
            .fg(pick(light, Color::Indexed(241), Color::Indexed(240)))
            .add_modifier(Modifier::DIM),

        LineType::TableHeader => Style::default().add_modifier(Modifier::BOLD),
        LineType::Table { striped: true } => {
            Style::default().bg(pick(light, Color::Indexed(254), Color::Indexed(236)))
        }

        LineType::ListItem(_)
        | LineType::Table { striped: false }
        | LineType::Paragraph
        | LineType::Empty => Style::default(),
    }
}

/// Merge inline emphasis onto a row's base style.
pub fn style_for_inline(base: Style, inline: InlineStyle, light: bool) -> Style {
    let mut style = base;
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style
            .add_modifier(Modifier::UNDERLINED)
            .fg(pick(light, Color::Blue, Color::LightBlue));
    }
    if inline.code {
        style = style
            .fg(pick(light, Color::Indexed(88), Color::Red))
            .add_modifier(Modifier::BOLD);
    }
    style
}

/// Style for a raw markdown source row, keyed off its leading syntax.
pub fn style_for_source(text: &str, in_fence: bool, light: bool) -> Style {
    let trimmed = text.trim_start();
    if in_fence || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        return Style::default().fg(pick(light, Color::Indexed(238), Color::Indexed(245)));
    }
    if trimmed.starts_with('#') {
        return Style::default()
            .fg(pick(light, Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD);
    }
    if trimmed.starts_with('>') {
        return Style::default().fg(pick(light, Color::Indexed(24), Color::Blue));
    }
    Style::default()
}

pub fn gutter_style(light: bool) -> Style {
    Style::default().fg(pick(light, Color::Indexed(246), Color::Indexed(241)))
}

/// Highlight for the heading the preview is currently showing.
pub fn active_heading_style(light: bool) -> Style {
    Style::default()
        .fg(pick(light, Color::Indexed(24), Color::Yellow))
        .add_modifier(Modifier::BOLD)
}

pub fn focused_border_style() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn status_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorfgbg_background_detection() {
        assert!(light_from_colorfgbg(Some("0;15")));
        assert!(light_from_colorfgbg(Some("0;default;7")));
        assert!(!light_from_colorfgbg(Some("15;0")));
        assert!(!light_from_colorfgbg(Some("garbage")));
        assert!(!light_from_colorfgbg(None));
    }

    #[test]
    fn test_explicit_themes_ignore_environment() {
        assert!(is_light(ThemeMode::Light));
        assert!(!is_light(ThemeMode::Dark));
    }

    #[test]
    fn test_striped_rows_get_background() {
        let striped = style_for_line_type(&LineType::Table { striped: true }, false);
        let plain = style_for_line_type(&LineType::Table { striped: false }, false);
        assert!(striped.bg.is_some());
        assert!(plain.bg.is_none());
    }

    #[test]
    fn test_inline_code_and_links() {
        let code = style_for_inline(
            Style::default(),
            InlineStyle {
                code: true,
                ..InlineStyle::default()
            },
            false,
        );
        assert_eq!(code.fg, Some(Color::Red));
        let link = style_for_inline(
            Style::default(),
            InlineStyle {
                link: true,
                ..InlineStyle::default()
            },
            true,
        );
        assert_eq!(link.fg, Some(Color::Blue));
        assert!(link.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_source_heading_rows_are_bold() {
        let style = style_for_source("## Setup", false, false);
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(style_for_source("plain", false, false), Style::default());
    }
}
