use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{Focus, Message, Model};
use crate::sync::debounce::Debouncer;

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: isize = 3;

/// Translate a terminal event. Resizes are queued rather than applied so a
/// drag-resize relays out once.
pub(super) fn handle_event(
    event: &Event,
    model: &Model,
    now_ms: u64,
    resize_debouncer: &mut Debouncer<(u16, u16)>,
) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(*key, model),
        Event::Mouse(mouse) => handle_mouse(*mouse, model),
        Event::Resize(w, h) => {
            resize_debouncer.queue((*w, *h), now_ms);
            None
        }
        _ => None,
    }
}

pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match key.code {
            KeyCode::Char('c' | 'q') => Some(Message::Quit),
            KeyCode::Char('d') => Some(Message::HalfPageDown),
            KeyCode::Char('u') => Some(Message::HalfPageUp),
            _ => None,
        };
    }

    if model.help_visible {
        return match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) => Some(Message::HideHelp),
            _ => None,
        };
    }

    if model.focus == Focus::Toc {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => return Some(Message::TocDown),
            KeyCode::Char('k') | KeyCode::Up => return Some(Message::TocUp),
            KeyCode::Enter | KeyCode::Char(' ') => return Some(Message::TocSelect),
            KeyCode::Esc => return Some(Message::SwitchFocus),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Char('q') => Some(Message::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
        KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
        KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
        KeyCode::Tab => Some(Message::SwitchFocus),
        KeyCode::Char('t') => Some(Message::ToggleToc),
        KeyCode::Char('s') => Some(Message::ToggleSync),
        KeyCode::Char('w') => Some(Message::ToggleWordWrap),
        KeyCode::Char('n') => Some(Message::ToggleLineNumbers),
        KeyCode::Char('T') => Some(Message::CycleTheme),
        KeyCode::Char('e') => Some(Message::Export),
        KeyCode::Char('r' | 'R') => Some(Message::ForceReload),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        _ => None,
    }
}

pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    if model.help_visible {
        return None;
    }
    let region = region_at(model, mouse.column, mouse.row)?;
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Message::Wheel {
            region,
            delta: WHEEL_ROWS,
        }),
        MouseEventKind::ScrollUp => Some(Message::Wheel {
            region,
            delta: -WHEEL_ROWS,
        }),
        MouseEventKind::Up(MouseButton::Left) if region == Focus::Toc => {
            toc_index_at(model, mouse.row).map(Message::TocClick)
        }
        _ => None,
    }
}

fn point_in_rect(column: u16, row: u16, rect: Rect) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// Pane under a screen cell.
fn region_at(model: &Model, column: u16, row: u16) -> Option<Focus> {
    let areas = model.areas();
    if areas.toc.is_some_and(|toc| point_in_rect(column, row, toc)) {
        Some(Focus::Toc)
    } else if point_in_rect(column, row, areas.source) {
        Some(Focus::Source)
    } else if point_in_rect(column, row, areas.preview) {
        Some(Focus::Preview)
    } else {
        None
    }
}

/// Heading index for a click inside the sidebar, skipping its border.
fn toc_index_at(model: &Model, row: u16) -> Option<usize> {
    let toc = model.areas().toc?;
    if row <= toc.y || row >= toc.y + toc.height.saturating_sub(1) {
        return None;
    }
    let len = model.session.headings().len();
    let visible = toc.height.saturating_sub(2) as usize;
    let start = model.toc_scroll_offset.min(len.saturating_sub(visible));
    let index = start + (row - toc.y - 1) as usize;
    (index < len).then_some(index)
}
