//! Headless host driving a session with in-memory panes.
//!
//! Every programmatic scroll is echoed back as a scroll event, the way a real
//! host reports it, so these tests also cover feedback-loop prevention.

use marksync::config::{Settings, SyncSettings};
use marksync::document::Document;
use marksync::memory::{EchoQueue, MemoryLayout, MemoryTarget, PlacedHeading};
use marksync::session::SyncSession;
use marksync::sync::{EDITOR, PREVIEW};
use marksync::toc::NavigationOutcome;

struct Host {
    editor: MemoryTarget,
    preview: MemoryTarget,
    echoes: EchoQueue,
    session: SyncSession,
}

impl Host {
    fn new(layout: impl FnOnce(MemoryTarget) -> MemoryLayout) -> Self {
        let echoes = EchoQueue::default();
        let editor = MemoryTarget::new(2500.0, 500.0).with_echo(EDITOR, echoes.clone());
        let preview = MemoryTarget::new(4500.0, 500.0).with_echo(PREVIEW, echoes.clone());
        let settings = Settings {
            sync: SyncSettings {
                smooth_scroll: false,
                ..SyncSettings::default()
            },
            ..Settings::default()
        };
        let mut session = SyncSession::from_settings(&settings, Box::new(layout(preview.clone())));
        session.register_target(EDITOR, Box::new(editor.clone()));
        session.register_target(PREVIEW, Box::new(preview.clone()));
        Self {
            editor,
            preview,
            echoes,
            session,
        }
    }

    /// Advance the clock one millisecond at a time, delivering echoes first.
    fn run(&mut self, from: u64, to: u64) {
        for now in from..=to {
            let pending: Vec<String> = self.echoes.borrow_mut().drain(..).collect();
            for key in pending {
                self.session.on_scroll(&key, now);
            }
            self.session.tick(now);
        }
    }
}

fn fixed_layout(preview: MemoryTarget) -> MemoryLayout {
    MemoryLayout::new(preview)
        .with_heading("intro", "Intro", 0.0)
        .with_heading("install", "Install", 1000.0)
        .with_heading("usage", "Usage", 2000.0)
        .with_heading("faq", "FAQ", 3900.0)
}

fn fixed_host() -> Host {
    let mut host = Host::new(fixed_layout);
    host.session.set_headings(
        ["intro", "install", "usage", "faq"]
            .iter()
            .map(|id| marksync::toc::Heading::new(*id, *id, 2))
            .collect(),
        0,
    );
    host.run(0, 300);
    host
}

#[test]
fn test_editor_scroll_does_not_bounce_back() {
    let mut host = fixed_host();
    // 47.5% of the editor maps to 1900 in the preview, leaving usage 100 below the top.
    host.editor.set_scroll_top(950.0);
    host.session.on_scroll(EDITOR, 1000);
    host.run(1000, 1500);

    assert_eq!(host.preview.scroll_top(), 1900.0);
    assert_eq!(host.preview.request_count(), 1);
    assert_eq!(host.editor.request_count(), 0, "preview echo must not drive the editor");
    assert_eq!(host.session.active_heading(), Some("usage"));
    assert!(!host.session.has_pending_work());
}

#[test]
fn test_heading_navigation_settles_and_syncs_editor_once() {
    let mut host = fixed_host();
    let outcome = host.session.scroll_to_heading("usage", 2000);
    assert!(matches!(outcome, NavigationOutcome::Navigated { ref id, .. } if id == "usage"));
    assert_eq!(host.preview.scroll_top(), 1920.0);

    host.run(2000, 3000);
    assert_eq!(host.editor.request_count(), 1);
    assert_eq!(host.editor.scroll_top(), 960.0);
    assert_eq!(host.preview.request_count(), 1);
    assert_eq!(host.session.active_heading(), Some("usage"));
}

#[test]
fn test_unknown_heading_falls_back_to_first() {
    let mut host = fixed_host();
    let outcome = host.session.scroll_to_heading("does-not-exist", 500);
    assert!(matches!(outcome, NavigationOutcome::Fallback { ref id, .. } if id == "intro"));
    assert_eq!(host.preview.scroll_top(), 0.0);
    host.run(500, 1500);
    assert_eq!(host.session.active_heading(), Some("intro"));
}

#[test]
fn test_parsed_document_headings_drive_the_session() {
    let md = "# Marksync\n\nIntro.\n\n## Install\n\nSteps.\n\n## Usage\n\nMore.\n\n## Usage\n\nAgain.\n";
    let doc = Document::parse(md).unwrap();
    let placed: Vec<PlacedHeading> = doc
        .headings()
        .iter()
        .map(|h| PlacedHeading {
            id: h.id.clone(),
            text: h.text.clone(),
            offset: h.line as f64 * 300.0,
            height: 30.0,
        })
        .collect();

    let mut host = Host::new(|preview| {
        let layout = MemoryLayout::new(preview);
        layout.set_headings(placed);
        layout
    });
    host.session.set_headings(doc.toc_headings(), 0);

    let list = host.session.headings();
    assert_eq!(list.len(), 4);
    assert!(list.contains("usage"));
    assert!(list.contains("usage-1"), "duplicate headings get distinct ids");

    host.run(0, 300);
    assert_eq!(host.session.active_heading(), Some("marksync"));
    assert!(host.session.scroll_to_heading("install", 400).scrolled());
    assert_eq!(host.session.active_heading(), Some("install"));
}

#[test]
fn test_detached_preview_reports_missing_container() {
    let layout = MemoryLayout::new(MemoryTarget::detached());
    let mut session = SyncSession::from_settings(&Settings::default(), Box::new(layout));
    session.set_headings(vec![marksync::toc::Heading::new("intro", "Intro", 1)], 0);
    assert_eq!(
        session.scroll_to_heading("intro", 10),
        NavigationOutcome::ContainerMissing
    );
}
