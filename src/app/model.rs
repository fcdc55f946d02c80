use std::path::PathBuf;

use anyhow::{Context, Result};
use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::config::{self, Settings};
use crate::document::{self, Document, SourceLayout};
use crate::session::SyncSession;
use crate::sync::{EDITOR, PREVIEW, SyncConfig};
use crate::toc::NavigationOutcome;
use crate::ui::{self, Areas, Pane, PaneHandle, PreviewGeometry};

/// How long a status message stays in the status bar.
const MESSAGE_MS: u64 = 3000;

/// Which region receives keyboard scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Source,
    Preview,
    Toc,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    expires_at: u64,
}

/// The complete application state.
///
/// The source and preview panes are shared with the sync session, which
/// scrolls them directly; everything else is owned here.
#[derive(Debug)]
pub struct Model {
    pub file_path: PathBuf,
    pub settings: Settings,
    /// Where settings are persisted; `None` keeps changes in memory
    pub settings_path: Option<PathBuf>,
    pub document: Document,
    pub source_layout: SourceLayout,
    pub source_pane: PaneHandle,
    pub preview_pane: PaneHandle,
    geometry: PreviewGeometry,
    pub session: SyncSession,
    pub focus: Focus,
    pub toc_visible: bool,
    pub toc_selected: Option<usize>,
    pub toc_scroll_offset: usize,
    pub help_visible: bool,
    pub watch_enabled: bool,
    /// Light palette in use
    pub light: bool,
    pub should_quit: bool,
    size: (u16, u16),
    message: Option<StatusMessage>,
    settings_dirty_since: Option<u64>,
}

impl Model {
    /// Build the model for `source` laid out on a `size` terminal.
    ///
    /// # Errors
    /// Returns an error if the markdown cannot be rendered.
    pub fn new(
        file_path: PathBuf,
        source: String,
        settings: Settings,
        size: (u16, u16),
        toc_visible: bool,
    ) -> Result<Self> {
        let source_pane = PaneHandle::new(Pane::default());
        let preview_pane = PaneHandle::new(Pane::default());
        let geometry = PreviewGeometry::new(preview_pane.clone());
        let mut session = SyncSession::with_components(
            SyncConfig::default(),
            ui::pane::observer_config(),
            ui::pane::navigator_config(),
            Box::new(geometry.clone()),
        )
        .with_settings(&settings);
        session.register_target(EDITOR, Box::new(source_pane.clone()));
        session.register_target(PREVIEW, Box::new(preview_pane.clone()));

        let mut model = Self {
            file_path,
            light: ui::style::is_light(settings.theme),
            settings,
            settings_path: None,
            document: Document::empty(),
            source_layout: SourceLayout::default(),
            source_pane,
            preview_pane,
            geometry,
            session,
            focus: Focus::Source,
            toc_visible,
            toc_selected: None,
            toc_scroll_offset: 0,
            help_visible: false,
            watch_enabled: false,
            should_quit: false,
            size,
            message: None,
            settings_dirty_since: None,
        };
        model.render_source(source, 0)?;
        Ok(model)
    }

    #[must_use]
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    pub const fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Screen regions for the current size and sidebar state.
    pub fn areas(&self) -> Areas {
        ui::split_areas(Rect::new(0, 0, self.size.0, self.size.1), self.toc_visible)
    }

    /// Re-render `source` into both panes, keeping their offsets where the
    /// new content allows.
    fn render_source(&mut self, source: String, now_ms: u64) -> Result<()> {
        let areas = self.areas();
        let source_area = ui::source_text_area(areas.source);
        let preview_area = ui::preview_text_area(areas.preview);

        let options = document::render_options(&self.settings, preview_area.width.max(1));
        let rendered = document::parse(&source, &options).context("failed to render markdown")?;
        self.source_layout = SourceLayout::new(
            &source,
            source_area.width,
            self.settings.word_wrap,
            self.settings.show_line_numbers,
        );

        {
            let mut pane = self.source_pane.borrow_mut();
            pane.set_total_rows(self.source_layout.row_count());
            pane.resize(source_area.width, source_area.height);
        }
        {
            let mut pane = self.preview_pane.borrow_mut();
            pane.set_total_rows(rendered.line_count());
            pane.resize(preview_area.width, preview_area.height);
        }

        self.geometry.set_headings(rendered.headings());
        self.session.set_headings(rendered.toc_headings(), now_ms);
        self.document = rendered;
        self.clamp_toc_selection();
        debug!(
            source_rows = self.source_layout.row_count(),
            preview_rows = self.document.line_count(),
            "laid out document"
        );
        Ok(())
    }

    /// Lay the current document out again, then restore the editor's
    /// position and carry it to the preview.
    pub fn relayout(&mut self, now_ms: u64) -> Result<()> {
        let source = self.document.source().to_owned();
        self.render_source(source, now_ms)?;
        self.session.remeasure(now_ms);
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16, now_ms: u64) -> Result<()> {
        self.size = (width, height);
        self.relayout(now_ms)
    }

    /// Read the file again after it changed on disk.
    pub fn reload(&mut self, now_ms: u64) -> Result<()> {
        let source = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("failed to read {}", self.file_path.display()))?;
        self.render_source(source, now_ms)?;
        self.session.remeasure(now_ms);
        Ok(())
    }

    /// Scroll one pane as a user would and report it to the session.
    pub fn scroll_pane(&mut self, focus: Focus, now_ms: u64, action: impl FnOnce(&mut Pane) -> bool) {
        let (handle, key) = match focus {
            Focus::Source => (self.source_pane.clone(), EDITOR),
            Focus::Preview => (self.preview_pane.clone(), PREVIEW),
            Focus::Toc => return,
        };
        let moved = action(&mut *handle.borrow_mut());
        if moved {
            self.session.on_scroll(key, now_ms);
        }
    }

    /// Advance animations and timers. Returns whether a redraw is needed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = self.source_pane.borrow_mut().animate();
        changed |= self.preview_pane.borrow_mut().animate();

        let tick = self.session.tick(now_ms);
        if !tick.is_empty() {
            changed = true;
        }
        if tick.active_changed && self.focus != Focus::Toc {
            self.follow_active_heading();
        }

        if self.message.as_ref().is_some_and(|m| m.expires_at <= now_ms) {
            self.message = None;
            changed = true;
        }
        self.autosave_settings(now_ms);
        changed
    }

    /// Whether a timer or animation still needs frequent ticks.
    pub fn has_pending_work(&self) -> bool {
        self.session.has_pending_work()
            || self.source_pane.borrow().is_animating()
            || self.preview_pane.borrow().is_animating()
            || self.settings_dirty_since.is_some()
    }

    pub fn show_message(&mut self, text: impl Into<String>, now_ms: u64) {
        self.message = Some(StatusMessage {
            text: text.into(),
            expires_at: now_ms + MESSAGE_MS,
        });
    }

    pub fn status_message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    pub fn toggle_toc(&mut self, now_ms: u64) -> Result<()> {
        self.toc_visible = !self.toc_visible;
        if !self.toc_visible && self.focus == Focus::Toc {
            self.focus = Focus::Source;
        }
        self.relayout(now_ms)
    }

    /// Cycle Source → Preview → Contents (when shown) → Source.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Source => Focus::Preview,
            Focus::Preview if self.toc_visible => Focus::Toc,
            Focus::Preview | Focus::Toc => Focus::Source,
        };
        if self.focus == Focus::Toc && self.toc_selected.is_none() {
            self.follow_active_heading();
            if self.toc_selected.is_none() && !self.session.headings().is_empty() {
                self.toc_selected = Some(0);
            }
        }
    }

    pub fn toc_move(&mut self, down: bool) {
        let len = self.session.headings().len();
        if len == 0 {
            self.toc_selected = None;
            return;
        }
        let next = match (self.toc_selected, down) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.toc_selected = Some(next);
        self.ensure_toc_visible();
    }

    pub fn toc_scroll(&mut self, delta: isize) {
        let len = self.session.headings().len();
        let max = len.saturating_sub(self.toc_rows());
        self.toc_scroll_offset = self
            .toc_scroll_offset
            .saturating_add_signed(delta)
            .min(max);
    }

    /// Jump the preview to the heading at `index` of the contents list.
    pub fn toc_activate(&mut self, index: usize, now_ms: u64) -> NavigationOutcome {
        let id = self
            .session
            .headings()
            .as_slice()
            .get(index)
            .map(|h| h.id.clone())
            .unwrap_or_default();
        self.toc_selected = (index < self.session.headings().len()).then_some(index);
        let outcome = self.session.scroll_to_heading(&id, now_ms);
        match &outcome {
            NavigationOutcome::Navigated { .. } | NavigationOutcome::Fallback { .. } => {}
            NavigationOutcome::NoHeadings => self.show_message("No headings", now_ms),
            NavigationOutcome::EmptyId => {}
            NavigationOutcome::Unresolved { id } => {
                self.show_message(format!("Heading not found: {id}"), now_ms);
            }
            NavigationOutcome::ContainerMissing => self.show_message("Preview not ready", now_ms),
        }
        outcome
    }

    pub fn toggle_sync(&mut self, now_ms: u64) {
        let enabled = self.session.toggle_sync();
        self.settings.sync.enabled = enabled;
        self.show_message(if enabled { "Scroll sync on" } else { "Scroll sync off" }, now_ms);
        self.mark_settings_dirty(now_ms);
    }

    /// Flip word wrap; the session remeasures once the source is re-laid out.
    pub fn toggle_word_wrap(&mut self, now_ms: u64) -> Result<()> {
        self.settings.word_wrap = !self.settings.word_wrap;
        let source = self.document.source().to_owned();
        self.render_source(source, now_ms)?;
        self.session.apply_settings(&self.settings, now_ms);
        self.mark_settings_dirty(now_ms);
        Ok(())
    }

    pub fn toggle_line_numbers(&mut self, now_ms: u64) -> Result<()> {
        self.settings.show_line_numbers = !self.settings.show_line_numbers;
        let source = self.document.source().to_owned();
        self.render_source(source, now_ms)?;
        let change = self.session.apply_settings(&self.settings, now_ms);
        if change.line_numbers_changed && self.settings.word_wrap {
            // The gutter narrows the text column, so wrapped rows move.
            self.session.remeasure(now_ms);
        }
        self.mark_settings_dirty(now_ms);
        Ok(())
    }

    /// Step to the next theme mode and re-resolve light or dark.
    pub fn cycle_theme(&mut self, now_ms: u64) {
        self.settings.theme = self.settings.theme.next();
        self.light = ui::style::is_light(self.settings.theme);
        debug!(theme = self.settings.theme.as_str(), light = self.light, "theme changed");
        self.show_message(format!("Theme: {}", self.settings.theme.as_str()), now_ms);
        self.mark_settings_dirty(now_ms);
    }

    /// Where [`export_preview`](Self::export_preview) writes, next to the
    /// source file.
    pub fn export_path(&self) -> PathBuf {
        let stem = self
            .file_path
            .file_stem()
            .map_or_else(|| "document".to_string(), |stem| stem.to_string_lossy().into_owned());
        self.file_path.with_file_name(format!("{stem}.export.txt"))
    }

    /// Write the rendered preview to [`export_path`](Self::export_path).
    pub fn export_preview(&mut self, now_ms: u64) -> Result<PathBuf> {
        let path = self.export_path();
        std::fs::write(&path, self.document.to_plain_text())
            .with_context(|| format!("failed to export {}", path.display()))?;
        debug!(path = %path.display(), rows = self.document.line_count(), "preview exported");
        self.show_message(format!("Exported {}", path.display()), now_ms);
        Ok(path)
    }

    fn mark_settings_dirty(&mut self, now_ms: u64) {
        if self.settings_path.is_some() && self.session.gate().auto_save() {
            self.settings_dirty_since = Some(now_ms);
        }
    }

    /// Persist runtime setting changes once they have been quiet for the
    /// auto-save interval.
    fn autosave_settings(&mut self, now_ms: u64) {
        let Some(since) = self.settings_dirty_since else {
            return;
        };
        if now_ms.saturating_sub(since) < self.session.gate().auto_save_interval() {
            return;
        }
        self.settings_dirty_since = None;
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        match config::save_settings(path, &self.settings) {
            Ok(()) => debug!(path = %path.display(), "settings saved"),
            Err(err) => warn!(%err, "could not save settings"),
        }
    }

    fn follow_active_heading(&mut self) {
        let Some(active) = self.session.active_heading() else {
            return;
        };
        if let Some(index) = self.session.headings().position(active) {
            self.toc_selected = Some(index);
            self.ensure_toc_visible();
        }
    }

    fn toc_rows(&self) -> usize {
        self.areas()
            .toc
            .map_or(0, |area| area.height.saturating_sub(2) as usize)
    }

    fn ensure_toc_visible(&mut self) {
        let Some(selected) = self.toc_selected else {
            return;
        };
        let rows = self.toc_rows().max(1);
        if selected < self.toc_scroll_offset {
            self.toc_scroll_offset = selected;
        } else if selected >= self.toc_scroll_offset + rows {
            self.toc_scroll_offset = selected + 1 - rows;
        }
    }

    fn clamp_toc_selection(&mut self) {
        let len = self.session.headings().len();
        self.toc_selected = self.toc_selected.filter(|&i| i < len);
        if let Some(active) = self.session.active_heading()
            && self.toc_selected.is_none()
        {
            self.toc_selected = self.session.headings().position(active);
        }
        self.toc_scroll_offset = self.toc_scroll_offset.min(len.saturating_sub(1));
    }
}
