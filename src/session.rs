//! One previewer session: sync, heading tracking and navigation wired together.

use crate::config::Settings;
use crate::sync::coordinator::{
    EDITOR, PREVIEW, Propagation, Registration, SyncConfig, SyncConfigUpdate, SyncCoordinator,
};
use crate::sync::target::{ScrollTarget, ScrollUpdate};
use crate::toc::navigator::{NavigationOutcome, NavigatorConfig, TocNavigator};
use crate::toc::observer::{HeadingObserver, ObserverConfig, PreviewLayout};
use crate::toc::{Heading, HeadingList, TocState};

/// Snapshot of the settings that switch optional session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsGate {
    word_wrap: bool,
    auto_save: bool,
    auto_save_interval: u64,
    show_line_numbers: bool,
}

/// What changed between two observed settings snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub word_wrap_changed: bool,
    pub line_numbers_changed: bool,
}

impl SettingsGate {
    pub fn new(settings: &Settings) -> Self {
        Self {
            word_wrap: settings.word_wrap,
            auto_save: settings.auto_save,
            auto_save_interval: settings.auto_save_interval,
            show_line_numbers: settings.show_line_numbers,
        }
    }

    pub const fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    pub const fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub const fn auto_save_interval(&self) -> u64 {
        self.auto_save_interval
    }

    pub const fn show_line_numbers(&self) -> bool {
        self.show_line_numbers
    }

    /// Take a new snapshot and report what differs from the last one.
    pub fn observe(&mut self, settings: &Settings) -> SettingsChange {
        let next = Self::new(settings);
        let change = SettingsChange {
            word_wrap_changed: next.word_wrap != self.word_wrap,
            line_numbers_changed: next.show_line_numbers != self.show_line_numbers,
        };
        *self = next;
        change
    }
}

/// Everything that happened during one [`SyncSession::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTick {
    pub propagations: Vec<Propagation>,
    pub active_changed: bool,
    /// Heading whose navigation settled during this tick
    pub settled: Option<String>,
}

impl SessionTick {
    pub fn is_empty(&self) -> bool {
        self.propagations.is_empty() && !self.active_changed && self.settled.is_none()
    }
}

/// Facade over the coordinator, observer and navigator for one document.
///
/// The preview is registered under [`PREVIEW`] and described by the layout
/// passed to [`new`](Self::new); the editor and any other panes register
/// themselves with [`register_target`](Self::register_target).
pub struct SyncSession {
    sync: SyncCoordinator,
    toc: TocState,
    observer: HeadingObserver,
    navigator: TocNavigator,
    gate: SettingsGate,
    layout: Box<dyn PreviewLayout>,
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("sync", &self.sync)
            .field("toc", &self.toc)
            .field("observer", &self.observer)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

impl SyncSession {
    pub fn new(config: SyncConfig, layout: Box<dyn PreviewLayout>) -> Self {
        Self::with_components(
            config,
            ObserverConfig::default(),
            NavigatorConfig::default(),
            layout,
        )
    }

    pub fn with_components(
        config: SyncConfig,
        observer: ObserverConfig,
        navigator: NavigatorConfig,
        layout: Box<dyn PreviewLayout>,
    ) -> Self {
        Self {
            sync: SyncCoordinator::new(config),
            toc: TocState::default(),
            observer: HeadingObserver::new(observer),
            navigator: TocNavigator::new(navigator),
            gate: SettingsGate::new(&Settings::default()),
            layout,
        }
    }

    /// Build a session configured from stored settings.
    pub fn from_settings(settings: &Settings, layout: Box<dyn PreviewLayout>) -> Self {
        Self::new(SyncConfig::default(), layout).with_settings(settings)
    }

    /// Adopt stored settings without remeasuring.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.sync.update_config(settings.sync.to_update());
        self.gate = SettingsGate::new(settings);
        self
    }

    pub const fn coordinator(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub const fn toc(&self) -> &TocState {
        &self.toc
    }

    pub const fn gate(&self) -> &SettingsGate {
        &self.gate
    }

    pub fn layout(&self) -> &dyn PreviewLayout {
        self.layout.as_ref()
    }

    pub fn register_target(&mut self, key: impl Into<String>, target: Box<dyn ScrollTarget>) -> Registration {
        self.sync.register_target(key, target)
    }

    pub fn unregister(&mut self, registration: &Registration) -> bool {
        if registration.key() == PREVIEW {
            self.navigator.cancel(&mut self.sync);
        }
        self.sync.unregister(registration)
    }

    /// Scroll listener entry point for every registered pane.
    pub fn on_scroll(&mut self, key: &str, now_ms: u64) -> bool {
        let accepted = self.sync.on_scroll(key, now_ms);
        if key == PREVIEW && !self.navigator.is_navigating() {
            self.observer.on_scroll(self.layout.as_ref(), now_ms);
        }
        accepted
    }

    /// Replace the document's headings after a re-render.
    pub fn set_headings(&mut self, headings: Vec<Heading>, now_ms: u64) {
        self.toc.set_headings(headings);
        let (list, active) = self.toc.parts_mut();
        self.observer.bind(list, active, now_ms);
    }

    pub fn tick(&mut self, now_ms: u64) -> SessionTick {
        let before = self.toc.active().map(str::to_owned);
        let mut propagations = self.sync.tick(now_ms);

        let settled = self
            .navigator
            .tick(&mut self.toc, self.layout.as_ref(), &mut self.sync, now_ms)
            .map(|settled| {
                propagations.extend(settled.propagations);
                settled.id
            });

        if !self.navigator.is_navigating() {
            if settled.is_none() && propagations.iter().any(|p| p.target == PREVIEW) {
                self.observer.on_scroll(self.layout.as_ref(), now_ms);
            }
            self.observer
                .tick(self.layout.as_ref(), self.toc.active_mut(), now_ms);
        }

        SessionTick {
            active_changed: self.toc.active() != before.as_deref(),
            propagations,
            settled,
        }
    }

    /// Navigate the preview to a heading from the TOC.
    pub fn scroll_to_heading(&mut self, id: &str, now_ms: u64) -> NavigationOutcome {
        self.observer.cancel_pending();
        self.navigator.scroll_to_heading(
            id,
            &mut self.toc,
            self.layout.as_ref(),
            &mut self.sync,
            PREVIEW,
            now_ms,
        )
    }

    pub fn headings(&self) -> &HeadingList {
        self.toc.headings()
    }

    pub fn active_heading(&self) -> Option<&str> {
        self.toc.active()
    }

    pub const fn is_navigating(&self) -> bool {
        self.navigator.is_navigating()
    }

    pub const fn is_sync_enabled(&self) -> bool {
        self.sync.is_enabled()
    }

    pub fn toggle_sync(&mut self) -> bool {
        self.sync.toggle()
    }

    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.sync.set_enabled(enabled);
    }

    pub fn update_config(&mut self, update: SyncConfigUpdate) {
        self.sync.update_config(update);
    }

    /// Apply new settings. A word-wrap change remeasures the panes, so the
    /// host must have re-laid out the editor before calling this.
    pub fn apply_settings(&mut self, settings: &Settings, now_ms: u64) -> SettingsChange {
        self.sync.update_config(settings.sync.to_update());
        let change = self.gate.observe(settings);
        if change.word_wrap_changed {
            tracing::debug!(word_wrap = settings.word_wrap, "word wrap changed, remeasuring");
            self.remeasure(now_ms);
        }
        change
    }

    /// Restore the editor to its last known percentage after its layout
    /// changed, then push that position to every other pane. With sync off
    /// only the editor is restored.
    pub fn remeasure(&mut self, now_ms: u64) -> Vec<Propagation> {
        let Some(last) = self
            .sync
            .last_position(EDITOR)
            .or_else(|| self.sync.position(EDITOR))
        else {
            return Vec::new();
        };
        if !self.sync.is_enabled() {
            self.sync.restore(EDITOR, last.percentage);
            return Vec::new();
        }
        if !self
            .sync
            .sync_to_target(EDITOR, &ScrollUpdate::percentage(last.percentage), now_ms)
        {
            return Vec::new();
        }
        let Some(restored) = self.sync.position(EDITOR) else {
            return Vec::new();
        };
        let propagations = self.sync.sync_all(EDITOR, restored, now_ms);
        if propagations.iter().any(|p| p.target == PREVIEW) && !self.navigator.is_navigating() {
            self.observer.on_scroll(self.layout.as_ref(), now_ms);
        }
        propagations
    }

    /// Whether any timer is still running; hosts may sleep otherwise.
    pub fn has_pending_work(&self) -> bool {
        self.sync.has_pending_work() || self.observer.has_pending_work() || self.navigator.is_navigating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLayout, MemoryTarget};

    struct Harness {
        editor: MemoryTarget,
        preview: MemoryTarget,
        session: SyncSession,
    }

    fn harness() -> Harness {
        let editor = MemoryTarget::new(2500.0, 500.0);
        let preview = MemoryTarget::new(4500.0, 500.0);
        let layout = MemoryLayout::new(preview.clone())
            .with_heading("intro", "Intro", 0.0)
            .with_heading("install", "Install", 1000.0)
            .with_heading("usage", "Usage", 2000.0)
            .with_heading("faq", "FAQ", 3900.0);
        let mut session = SyncSession::new(
            SyncConfig {
                smooth_scroll: false,
                ..SyncConfig::default()
            },
            Box::new(layout),
        );
        session.register_target(EDITOR, Box::new(editor.clone()));
        session.register_target(PREVIEW, Box::new(preview.clone()));
        session.set_headings(
            vec![
                Heading::new("intro", "Intro", 1),
                Heading::new("install", "Install", 2),
                Heading::new("usage", "Usage", 2),
                Heading::new("faq", "FAQ", 2),
            ],
            0,
        );
        Harness {
            editor,
            preview,
            session,
        }
    }

    fn run(session: &mut SyncSession, from: u64, to: u64) -> Vec<SessionTick> {
        (from..=to)
            .map(|t| session.tick(t))
            .filter(|tick| !tick.is_empty())
            .collect()
    }

    #[test]
    fn test_initial_heading_detected_after_setup() {
        let mut h = harness();
        run(&mut h.session, 0, 300);
        assert_eq!(h.session.active_heading(), Some("intro"));
        assert!(!h.session.has_pending_work());
    }

    #[test]
    fn test_editor_scroll_moves_preview_and_active_heading() {
        let mut h = harness();
        run(&mut h.session, 0, 300);

        // 47.5% of the editor maps to 1900 in the preview, leaving usage 100 below the top.
        h.editor.set_scroll_top(950.0);
        h.session.on_scroll(EDITOR, 400);
        let ticks = run(&mut h.session, 400, 500);
        assert_eq!(h.preview.scroll_top(), 1900.0);
        assert!(ticks.iter().any(|t| t.active_changed));
        assert_eq!(h.session.active_heading(), Some("usage"));
    }

    #[test]
    fn test_navigation_suppresses_observer_and_settles_once() {
        let mut h = harness();
        run(&mut h.session, 0, 300);

        let outcome = h.session.scroll_to_heading("faq", 1000);
        assert!(outcome.scrolled());
        assert_eq!(h.session.active_heading(), Some("faq"));
        assert_eq!(h.preview.scroll_top(), 3820.0);

        // Scrolling events from the animation neither sync nor change the heading.
        assert!(!h.session.on_scroll(PREVIEW, 1100));
        let ticks = run(&mut h.session, 1001, 1700);
        let settled: Vec<_> = ticks.iter().filter(|t| t.settled.is_some()).collect();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].settled.as_deref(), Some("faq"));
        assert_eq!(h.editor.request_count(), 1);
        assert_eq!(h.session.active_heading(), Some("faq"));
    }

    #[test]
    fn test_sync_toggle() {
        let mut h = harness();
        assert!(h.session.is_sync_enabled());
        assert!(!h.session.toggle_sync());
        h.editor.set_scroll_top(900.0);
        assert!(!h.session.on_scroll(EDITOR, 0));
        run(&mut h.session, 0, 100);
        assert_eq!(h.preview.request_count(), 0);
        h.session.set_sync_enabled(true);
        assert!(h.session.on_scroll(EDITOR, 200));
    }

    #[test]
    fn test_word_wrap_change_remeasures() {
        let mut h = harness();
        h.editor.set_scroll_top(1000.0);
        h.session.on_scroll(EDITOR, 0);
        run(&mut h.session, 0, 100);
        h.preview.clear_requests();

        // Wrapping grows the editor; the session keeps it at 50%.
        h.editor.set_dimensions(4500.0, 500.0);
        let settings = Settings {
            word_wrap: false,
            sync: crate::config::SyncSettings {
                smooth_scroll: false,
                ..crate::config::SyncSettings::default()
            },
            ..Settings::default()
        };
        let change = h.session.apply_settings(&settings, 200);
        assert!(change.word_wrap_changed);
        assert_eq!(h.editor.scroll_top(), 2000.0);
        assert_eq!(h.preview.request_count(), 1);
        assert_eq!(h.preview.scroll_top(), 2000.0);

        let unchanged = h.session.apply_settings(&settings, 300);
        assert!(!unchanged.word_wrap_changed);
    }

    #[test]
    fn test_word_wrap_change_restores_editor_with_sync_off() {
        let mut h = harness();
        let settings = Settings {
            sync: crate::config::SyncSettings {
                enabled: false,
                smooth_scroll: false,
                ..crate::config::SyncSettings::default()
            },
            ..Settings::default()
        };
        h.session.apply_settings(&settings, 0);
        assert!(!h.session.is_sync_enabled());

        h.editor.set_scroll_top(1000.0);
        assert!(!h.session.on_scroll(EDITOR, 10));

        h.editor.set_dimensions(4500.0, 500.0);
        let change = h.session.apply_settings(
            &Settings {
                word_wrap: false,
                ..settings
            },
            200,
        );
        assert!(change.word_wrap_changed);
        assert_eq!(h.editor.scroll_top(), 2000.0);
        assert_eq!(h.preview.request_count(), 0);
    }

    #[test]
    fn test_empty_document_has_no_active_heading() {
        let mut h = harness();
        run(&mut h.session, 0, 300);
        h.session.set_headings(Vec::new(), 400);
        assert_eq!(h.session.active_heading(), None);
        assert_eq!(h.session.scroll_to_heading("intro", 500), NavigationOutcome::NoHeadings);
        assert_eq!(h.preview.request_count(), 0);
    }

    #[test]
    fn test_settings_gate_reports_changes() {
        let mut gate = SettingsGate::new(&Settings::default());
        let change = gate.observe(&Settings {
            show_line_numbers: false,
            ..Settings::default()
        });
        assert!(change.line_numbers_changed);
        assert!(!change.word_wrap_changed);
        assert!(!gate.show_line_numbers());
        assert!(gate.auto_save());
        assert_eq!(gate.auto_save_interval(), 5000);
    }
}
