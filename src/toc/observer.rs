//! Active heading detection from preview geometry.

use std::collections::HashSet;

use crate::sync::debounce::Debouncer;
use crate::sync::position::ScrollMetrics;

use super::{ActiveHeading, HeadingList};

/// A rendered heading with its current geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingElement {
    pub id: String,
    pub text: String,
    /// Offset of the element's top edge from the container's visible top edge
    pub top: f64,
    pub height: f64,
}

/// Read access to the rendered preview.
pub trait PreviewLayout {
    /// Metrics of the scroll container, or `None` when it is not mounted.
    fn viewport(&self) -> Option<ScrollMetrics>;

    /// Heading elements currently in the rendered output, in document order.
    fn heading_elements(&self) -> Vec<HeadingElement>;
}

/// Thresholds for heading detection. All distances are in layout units.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverConfig {
    /// Space at the top of the container excluded from detection (sticky header)
    pub top_margin: f64,
    /// Fraction of the container height excluded from the bottom of the band
    pub bottom_margin_ratio: f64,
    /// Distances closer than this count as a tie
    pub tie_epsilon: f64,
    /// Furthest below the top edge a heading may sit to win the fallback scan
    pub fallback_threshold: f64,
    pub debounce_ms: u64,
    pub setup_delay_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            top_margin: 80.0,
            bottom_margin_ratio: 0.6,
            tie_epsilon: 5.0,
            fallback_threshold: 100.0,
            debounce_ms: 50,
            setup_delay_ms: 200,
            retry_delay_ms: 100,
        }
    }
}

impl ObserverConfig {
    /// Detection band `(top, bottom)` for a container of the given height.
    pub fn band(&self, client_height: f64) -> (f64, f64) {
        let top = self.top_margin.max(0.0);
        let bottom = client_height * (1.0 - self.bottom_margin_ratio.clamp(0.0, 1.0));
        if bottom > top {
            (top, bottom)
        } else {
            (0.0, client_height.max(0.0))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Unbound,
    Pending { due_at: u64, retried: bool },
    Observing,
    Unavailable,
}

/// Tracks which heading the reader is looking at.
///
/// Binding to a heading list schedules setup after a short delay so the
/// renderer can lay out first. Scroll events are then evaluated against the
/// layout and the result is committed after a debounce.
#[derive(Debug, Clone)]
pub struct HeadingObserver {
    config: ObserverConfig,
    binding: Binding,
    bound_ids: HashSet<String>,
    bound_revision: Option<u64>,
    pending: Debouncer<Option<String>>,
}

impl Default for HeadingObserver {
    fn default() -> Self {
        Self::new(ObserverConfig::default())
    }
}

impl HeadingObserver {
    pub fn new(config: ObserverConfig) -> Self {
        let pending = Debouncer::new(config.debounce_ms);
        Self {
            config,
            binding: Binding::Unbound,
            bound_ids: HashSet::new(),
            bound_revision: None,
            pending,
        }
    }

    pub const fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn is_observing(&self) -> bool {
        self.binding == Binding::Observing
    }

    pub fn is_unavailable(&self) -> bool {
        self.binding == Binding::Unavailable
    }

    pub const fn bound_revision(&self) -> Option<u64> {
        self.bound_revision
    }

    /// Attach to a new heading list.
    ///
    /// An empty list tears observation down and clears the active heading.
    pub fn bind(&mut self, headings: &HeadingList, active: &mut ActiveHeading, now_ms: u64) {
        if self.bound_revision == Some(headings.revision()) {
            return;
        }
        self.pending.cancel();
        self.bound_revision = Some(headings.revision());
        if headings.is_empty() {
            self.unbind();
            active.clear();
            return;
        }
        self.bound_ids = headings.iter().map(|h| h.id.clone()).collect();
        self.binding = Binding::Pending {
            due_at: now_ms.saturating_add(self.config.setup_delay_ms),
            retried: false,
        };
    }

    /// Stop observing and forget the bound headings.
    pub fn unbind(&mut self) {
        self.binding = Binding::Unbound;
        self.bound_ids.clear();
        self.pending.cancel();
    }

    /// Drop a detection that has not been committed yet.
    pub fn cancel_pending(&mut self) {
        self.pending.cancel();
    }

    /// Re-evaluate after the container scrolled.
    pub fn on_scroll(&mut self, layout: &dyn PreviewLayout, now_ms: u64) {
        if !self.is_observing() {
            return;
        }
        if let Some(candidate) = self.evaluate(layout) {
            self.pending.queue(candidate, now_ms);
        }
    }

    /// Advance setup and commit any settled detection.
    ///
    /// Returns true when the active heading changed.
    pub fn tick(&mut self, layout: &dyn PreviewLayout, active: &mut ActiveHeading, now_ms: u64) -> bool {
        let mut changed = false;
        if let Binding::Pending { due_at, retried } = self.binding
            && now_ms >= due_at
        {
            changed |= self.finish_setup(layout, active, retried, now_ms);
        }
        if let Some(candidate) = self.pending.take_ready(now_ms) {
            changed |= active.set(candidate);
        }
        changed
    }

    /// Whether setup or a commit is still outstanding.
    pub fn has_pending_work(&self) -> bool {
        matches!(self.binding, Binding::Pending { .. }) || self.pending.is_pending()
    }

    /// Run detection against the current layout without committing.
    pub fn detect(&self, layout: &dyn PreviewLayout) -> Option<String> {
        self.evaluate(layout).flatten()
    }

    fn finish_setup(
        &mut self,
        layout: &dyn PreviewLayout,
        active: &mut ActiveHeading,
        retried: bool,
        now_ms: u64,
    ) -> bool {
        if layout.viewport().is_some() {
            self.binding = Binding::Observing;
            tracing::debug!(headings = self.bound_ids.len(), "heading observer attached");
            if let Some(candidate) = self.evaluate(layout) {
                self.pending.queue(candidate, now_ms);
            }
            return false;
        }
        if retried {
            self.binding = Binding::Unavailable;
            tracing::warn!("preview container not found; active heading tracking disabled");
            return active.clear();
        }
        tracing::debug!("preview container not ready, retrying heading observer setup");
        self.binding = Binding::Pending {
            due_at: now_ms.saturating_add(self.config.retry_delay_ms),
            retried: true,
        };
        false
    }

    /// `None` when nothing can be evaluated; `Some(None)` when the layout was
    /// read but no heading qualifies.
    fn evaluate(&self, layout: &dyn PreviewLayout) -> Option<Option<String>> {
        let Some(viewport) = layout.viewport() else {
            tracing::debug!("preview container missing during heading detection");
            return None;
        };
        let elements: Vec<HeadingElement> = layout
            .heading_elements()
            .into_iter()
            .filter(|e| self.bound_ids.contains(&e.id))
            .collect();
        if elements.is_empty() {
            return None;
        }
        let index = select_active(&elements, viewport.client_height, &self.config);
        Some(index.map(|i| elements[i].id.clone()))
    }
}

/// Fraction of an element's height inside the band.
fn visible_ratio(element: &HeadingElement, band: (f64, f64)) -> f64 {
    let (band_top, band_bottom) = band;
    if element.height <= 0.0 {
        return if element.top >= band_top && element.top < band_bottom {
            1.0
        } else {
            0.0
        };
    }
    let start = element.top.max(band_top);
    let end = (element.top + element.height).min(band_bottom);
    ((end - start) / element.height).clamp(0.0, 1.0)
}

/// Pick the active heading among `elements` (document order).
///
/// Headings inside the top-biased band compete on distance from the top edge,
/// near-ties going to the more visible one. With nothing in the band, the
/// heading nearest the top edge among those at or above the fallback
/// threshold wins.
pub fn select_active(
    elements: &[HeadingElement],
    client_height: f64,
    config: &ObserverConfig,
) -> Option<usize> {
    let band = config.band(client_height);
    let visible: Vec<(usize, f64)> = elements
        .iter()
        .enumerate()
        .map(|(i, e)| (i, visible_ratio(e, band)))
        .filter(|(_, ratio)| *ratio > 0.0)
        .collect();

    if visible.is_empty() {
        return elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.top <= config.fallback_threshold)
            .min_by(|(_, a), (_, b)| a.top.abs().total_cmp(&b.top.abs()))
            .map(|(i, _)| i);
    }

    let from_top: Vec<(usize, f64)> = visible
        .iter()
        .copied()
        .filter(|(i, _)| elements[*i].top >= 0.0)
        .collect();
    if from_top.is_empty() {
        return visible.first().map(|(i, _)| *i);
    }

    let nearest = from_top
        .iter()
        .map(|(i, _)| elements[*i].top.abs())
        .fold(f64::INFINITY, f64::min);
    let mut best: Option<(usize, f64)> = None;
    for (i, ratio) in from_top {
        if elements[i].top.abs() - nearest >= config.tie_epsilon {
            continue;
        }
        if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
            best = Some((i, ratio));
        }
    }
    best.map(|(i, _)| i)
}
