//! Scrollable terminal panes and their adapters onto the sync engine.
//!
//! A [`Pane`] measures everything in rows: a row of scroll is one terminal
//! line, so the editor and preview share the sync engine's units directly.

use std::cell::{Ref, RefCell, RefMut};
use std::ops::Range;
use std::rc::Rc;

use crate::document::HeadingRef;
use crate::sync::{ScrollBehavior, ScrollMetrics, ScrollRequest, ScrollTarget};
use crate::toc::{HeadingElement, NavigatorConfig, ObserverConfig, PreviewLayout};

/// Fraction of the remaining distance covered per frame while animating.
const SMOOTH_STEP: f64 = 0.35;

/// One scrollable column of text.
///
/// `offset` is the logical scroll position the sync engine sees. The
/// rendered position trails it during smooth scrolls and catches up in
/// [`animate`](Self::animate).
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    width: u16,
    height: u16,
    offset: usize,
    total_rows: usize,
    shown: f64,
}

impl Default for Pane {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl Pane {
    pub const fn new(width: u16, height: u16, total_rows: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_rows,
            shown: 0.0,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Row currently drawn at the top of the pane.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn shown_offset(&self) -> usize {
        (self.shown.round().max(0.0) as usize).min(self.max_offset())
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Rows drawn this frame.
    pub fn visible_range(&self) -> Range<usize> {
        let start = self.shown_offset();
        let end = (start + self.height as usize).min(self.total_rows);
        start..end
    }

    /// Scroll progress (0-100). Content that fits reports 0.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max as f64) * 100.0).round() as u8
        }
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.offset < self.max_offset()
    }

    pub const fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height as usize)
    }

    /// Scroll by `delta` rows. Returns whether the position changed.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.jump_to(target)
    }

    pub fn page_up(&mut self) -> bool {
        self.scroll_by(-page_rows(self.height))
    }

    pub fn page_down(&mut self) -> bool {
        self.scroll_by(page_rows(self.height))
    }

    pub fn half_page_up(&mut self) -> bool {
        self.scroll_by(-page_rows(self.height / 2))
    }

    pub fn half_page_down(&mut self) -> bool {
        self.scroll_by(page_rows(self.height / 2))
    }

    pub fn go_to_top(&mut self) -> bool {
        self.jump_to(0)
    }

    pub fn go_to_bottom(&mut self) -> bool {
        self.jump_to(self.max_offset())
    }

    /// Put `row` at the top of the pane (clamped).
    #[allow(clippy::cast_precision_loss)]
    pub fn jump_to(&mut self, row: usize) -> bool {
        let target = row.min(self.max_offset());
        let moved = target != self.offset;
        self.offset = target;
        self.shown = target as f64;
        moved
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
        self.shown = self.shown.min(self.max_offset() as f64);
    }

    /// Update the content length after a re-layout.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_total_rows(&mut self, total: usize) {
        self.total_rows = total;
        self.offset = self.offset.min(self.max_offset());
        self.shown = self.shown.min(self.max_offset() as f64);
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn is_animating(&self) -> bool {
        (self.shown - self.offset as f64).abs() > f64::EPSILON
    }

    /// Advance a smooth scroll by one frame. Returns whether anything moved.
    #[allow(clippy::cast_precision_loss)]
    pub fn animate(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        let target = self.offset as f64;
        let remaining = target - self.shown;
        if remaining.abs() < 0.5 {
            self.shown = target;
        } else {
            self.shown += remaining * SMOOTH_STEP;
        }
        true
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.offset as f64,
            self.total_rows as f64,
            f64::from(self.height),
        )
    }

    /// Apply a programmatic scroll. Fractional rows are rounded.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(&mut self, request: ScrollRequest) {
        let Some(top) = request.top else {
            return;
        };
        let row = if top.is_finite() { top.round().max(0.0) as usize } else { 0 };
        let shown = self.shown;
        self.jump_to(row);
        if request.behavior == ScrollBehavior::Smooth {
            self.shown = shown;
        }
    }
}

fn page_rows(rows: u16) -> isize {
    isize::try_from(rows.max(1)).unwrap_or(1)
}

/// Shared handle to a pane, registered with the sync engine while the
/// host keeps drawing from it.
#[derive(Debug, Clone, Default)]
pub struct PaneHandle(Rc<RefCell<Pane>>);

impl PaneHandle {
    pub fn new(pane: Pane) -> Self {
        Self(Rc::new(RefCell::new(pane)))
    }

    pub fn borrow(&self) -> Ref<'_, Pane> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Pane> {
        self.0.borrow_mut()
    }
}

impl ScrollTarget for PaneHandle {
    /// A pane with no rows on screen counts as detached.
    fn metrics(&self) -> Option<ScrollMetrics> {
        let pane = self.0.borrow();
        (pane.height > 0).then(|| pane.metrics())
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        self.0.borrow_mut().apply(request);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeadingAnchor {
    id: String,
    text: String,
    row: usize,
}

/// Heading positions of the rendered preview, relative to its pane.
#[derive(Debug, Clone, Default)]
pub struct PreviewGeometry {
    pane: PaneHandle,
    anchors: Rc<RefCell<Vec<HeadingAnchor>>>,
}

impl PreviewGeometry {
    pub fn new(pane: PaneHandle) -> Self {
        Self {
            pane,
            anchors: Rc::default(),
        }
    }

    /// Record heading rows after the preview was re-rendered.
    pub fn set_headings(&self, headings: &[HeadingRef]) {
        *self.anchors.borrow_mut() = headings
            .iter()
            .map(|h| HeadingAnchor {
                id: h.id.clone(),
                text: h.text.clone(),
                row: h.line,
            })
            .collect();
    }
}

impl PreviewLayout for PreviewGeometry {
    fn viewport(&self) -> Option<ScrollMetrics> {
        self.pane.metrics()
    }

    #[allow(clippy::cast_precision_loss)]
    fn heading_elements(&self) -> Vec<HeadingElement> {
        let offset = self.pane.borrow().offset() as f64;
        self.anchors
            .borrow()
            .iter()
            .map(|anchor| HeadingElement {
                id: anchor.id.clone(),
                text: anchor.text.clone(),
                top: anchor.row as f64 - offset,
                height: 1.0,
            })
            .collect()
    }
}

/// Heading detection tuned for row units: the band starts at the first
/// row and the fallback looks three rows down.
pub fn observer_config() -> ObserverConfig {
    ObserverConfig {
        top_margin: 0.0,
        tie_epsilon: 0.5,
        fallback_threshold: 3.0,
        ..ObserverConfig::default()
    }
}

/// TOC jumps leave one row of context above the heading.
pub const fn navigator_config() -> NavigatorConfig {
    NavigatorConfig {
        fixed_offset: 1.0,
        settle_ms: 300,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_new_pane_starts_at_top() {
        let pane = Pane::new(80, 24, 100);
        assert_eq!(pane.offset(), 0);
        assert_eq!(pane.visible_range(), 0..24);
    }

    #[test]
    fn test_scroll_by_clamps_both_ends() {
        let mut pane = Pane::new(80, 24, 100);
        assert!(pane.scroll_by(1000));
        assert_eq!(pane.offset(), 76);
        assert!(!pane.scroll_by(1));
        assert!(pane.scroll_by(-1000));
        assert_eq!(pane.offset(), 0);
        assert!(!pane.scroll_by(-1));
    }

    #[test]
    fn test_paging() {
        let mut pane = Pane::new(80, 24, 100);
        pane.page_down();
        assert_eq!(pane.offset(), 24);
        pane.half_page_up();
        assert_eq!(pane.offset(), 12);
        pane.go_to_bottom();
        assert_eq!(pane.visible_range(), 76..100);
    }

    #[test]
    fn test_short_content_cannot_scroll() {
        let mut pane = Pane::new(80, 24, 10);
        assert!(!pane.can_scroll_down());
        assert!(!pane.page_down());
        assert_eq!(pane.scroll_percent(), 0);
        assert_eq!(pane.metrics().max_scroll(), 0.0);
    }

    #[test]
    fn test_resize_clamps_offset() {
        let mut pane = Pane::new(80, 24, 100);
        pane.go_to_bottom();
        pane.resize(80, 50);
        assert_eq!(pane.offset(), 50);
        pane.set_total_rows(30);
        assert_eq!(pane.offset(), 0);
    }

    #[test]
    fn test_instant_request_rounds_and_clamps() {
        let mut pane = Pane::new(80, 10, 50);
        pane.apply(ScrollRequest {
            top: Some(12.6),
            left: None,
            behavior: ScrollBehavior::Instant,
        });
        assert_eq!(pane.offset(), 13);
        assert_eq!(pane.shown_offset(), 13);
        pane.apply(ScrollRequest {
            top: Some(999.0),
            left: None,
            behavior: ScrollBehavior::Instant,
        });
        assert_eq!(pane.offset(), 40);
    }

    #[test]
    fn test_smooth_request_animates_toward_target() {
        let mut pane = Pane::new(80, 10, 200);
        pane.apply(ScrollRequest {
            top: Some(100.0),
            left: None,
            behavior: ScrollBehavior::Smooth,
        });
        assert_eq!(pane.offset(), 100);
        assert_eq!(pane.shown_offset(), 0);
        assert!(pane.is_animating());

        let mut frames = 0;
        while pane.animate() {
            frames += 1;
            assert!(frames < 100, "animation must converge");
        }
        assert_eq!(pane.shown_offset(), 100);
    }

    #[test]
    fn test_user_scroll_cancels_animation() {
        let mut pane = Pane::new(80, 10, 200);
        pane.apply(ScrollRequest {
            top: Some(100.0),
            left: None,
            behavior: ScrollBehavior::Smooth,
        });
        pane.scroll_by(-5);
        assert!(!pane.is_animating());
        assert_eq!(pane.shown_offset(), 95);
    }

    #[test]
    fn test_handle_is_detached_without_rows() {
        let handle = PaneHandle::new(Pane::new(80, 0, 100));
        assert!(handle.metrics().is_none());
        handle.borrow_mut().resize(80, 20);
        assert_eq!(handle.metrics().map(|m| m.client_height), Some(20.0));
    }

    #[test]
    fn test_handle_applies_percentage_updates() {
        let mut handle = PaneHandle::new(Pane::new(80, 20, 220));
        handle.set_scroll_position(
            &crate::sync::ScrollUpdate::percentage(0.5),
            crate::sync::ScrollInsets::default(),
            ScrollBehavior::Instant,
        );
        assert_eq!(handle.borrow().offset(), 100);
    }

    #[test]
    fn test_geometry_reports_rows_relative_to_offset() {
        let doc = Document::parse("# One\n\ntext\n\n## Two").unwrap();
        let pane = PaneHandle::new(Pane::new(80, 10, doc.line_count()));
        let geometry = PreviewGeometry::new(pane.clone());
        geometry.set_headings(doc.headings());

        let elements = geometry.heading_elements();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].id, "one");
        assert_eq!(elements[0].top, 0.0);
        let two_row = doc.headings()[1].line as f64;
        assert_eq!(elements[1].top, two_row);

        pane.borrow_mut().set_total_rows(100);
        pane.borrow_mut().jump_to(2);
        assert_eq!(geometry.heading_elements()[1].top, two_row - 2.0);
    }

    #[test]
    fn test_geometry_clones_share_anchors() {
        let geometry = PreviewGeometry::new(PaneHandle::new(Pane::new(80, 10, 10)));
        let other = geometry.clone();
        let doc = Document::parse("# Shared").unwrap();
        geometry.set_headings(doc.headings());
        assert_eq!(other.heading_elements().len(), 1);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_never_exceeds_max(
                height in 1u16..60,
                total in 0usize..500,
                ops in prop::collection::vec(-80isize..80, 0..30),
            ) {
                let mut pane = Pane::new(80, height, total);
                for delta in ops {
                    pane.scroll_by(delta);
                    prop_assert!(pane.offset() <= pane.max_offset());
                    prop_assert!(pane.visible_range().end <= total);
                }
            }

            #[test]
            fn animation_always_lands_on_offset(start in 0usize..300, target in 0f64..400.0) {
                let mut pane = Pane::new(80, 20, 320);
                pane.jump_to(start);
                pane.apply(ScrollRequest { top: Some(target), left: None, behavior: ScrollBehavior::Smooth });
                for _ in 0..200 {
                    if !pane.animate() {
                        break;
                    }
                }
                prop_assert!(!pane.is_animating());
                prop_assert_eq!(pane.shown_offset(), pane.offset());
            }
        }
    }
}
