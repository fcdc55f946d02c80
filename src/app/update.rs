use tracing::warn;

use crate::app::{Focus, Model};

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Scrolling the focused pane
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,
    /// Mouse wheel over a region, in rows (negative is up)
    Wheel { region: Focus, delta: isize },

    // Contents sidebar
    ToggleToc,
    SwitchFocus,
    TocUp,
    TocDown,
    /// Jump to the selected heading
    TocSelect,
    /// Select and jump to the heading at an index
    TocClick(usize),

    // Settings
    ToggleSync,
    ToggleWordWrap,
    ToggleLineNumbers,
    CycleTheme,
    /// Write the rendered preview next to the source file
    Export,

    ToggleHelp,
    HideHelp,
    /// File changed on disk
    FileChanged,
    ForceReload,
    Resize(u16, u16),
    Quit,
}

fn rows(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

/// Apply one message to the model.
pub fn update(model: &mut Model, msg: Message, now_ms: u64) {
    let focus = model.focus;
    match msg {
        Message::ScrollUp(n) => model.scroll_pane(focus, now_ms, |p| p.scroll_by(-rows(n))),
        Message::ScrollDown(n) => model.scroll_pane(focus, now_ms, |p| p.scroll_by(rows(n))),
        Message::PageUp => model.scroll_pane(focus, now_ms, crate::ui::Pane::page_up),
        Message::PageDown => model.scroll_pane(focus, now_ms, crate::ui::Pane::page_down),
        Message::HalfPageUp => model.scroll_pane(focus, now_ms, crate::ui::Pane::half_page_up),
        Message::HalfPageDown => model.scroll_pane(focus, now_ms, crate::ui::Pane::half_page_down),
        Message::GoToTop => model.scroll_pane(focus, now_ms, crate::ui::Pane::go_to_top),
        Message::GoToBottom => model.scroll_pane(focus, now_ms, crate::ui::Pane::go_to_bottom),
        Message::Wheel {
            region: Focus::Toc,
            delta,
        } => model.toc_scroll(delta),
        Message::Wheel { region, delta } => model.scroll_pane(region, now_ms, |p| p.scroll_by(delta)),

        Message::ToggleToc => report(model, now_ms, |m| m.toggle_toc(now_ms)),
        Message::SwitchFocus => model.cycle_focus(),
        Message::TocUp => model.toc_move(false),
        Message::TocDown => model.toc_move(true),
        Message::TocSelect => {
            if let Some(index) = model.toc_selected {
                model.toc_activate(index, now_ms);
            }
        }
        Message::TocClick(index) => {
            model.toc_activate(index, now_ms);
        }

        Message::ToggleSync => model.toggle_sync(now_ms),
        Message::ToggleWordWrap => report(model, now_ms, |m| m.toggle_word_wrap(now_ms)),
        Message::ToggleLineNumbers => report(model, now_ms, |m| m.toggle_line_numbers(now_ms)),
        Message::CycleTheme => model.cycle_theme(now_ms),
        Message::Export => report(model, now_ms, |m| m.export_preview(now_ms).map(drop)),

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::FileChanged | Message::ForceReload => {
            report(model, now_ms, |m| m.reload(now_ms));
        }
        Message::Resize(width, height) => report(model, now_ms, |m| m.resize(width, height, now_ms)),
        Message::Quit => model.should_quit = true,
    }
}

/// Run a fallible model operation; failures end up in the status bar.
fn report(model: &mut Model, now_ms: u64, op: impl FnOnce(&mut Model) -> anyhow::Result<()>) {
    if let Err(err) = op(model) {
        warn!("{err:#}");
        model.show_message(format!("{err:#}"), now_ms);
    }
}
