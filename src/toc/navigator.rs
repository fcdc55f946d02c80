//! Scrolling the preview to a heading chosen in the TOC.

use crate::sync::coordinator::{Propagation, SyncCoordinator};
use crate::sync::position::max_scroll;
use crate::sync::target::ScrollBehavior;

use super::observer::{HeadingElement, PreviewLayout};
use super::{Heading, TocState, normalize_heading_text, slugify};

#[derive(Debug, Clone, PartialEq)]
pub struct NavigatorConfig {
    /// Distance kept between the heading and the container's top edge
    pub fixed_offset: f64,
    /// How long a smooth scroll is given to finish
    pub settle_ms: u64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            fixed_offset: 80.0,
            settle_ms: 600,
        }
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// Scrolled to the requested heading.
    Navigated { id: String, top: f64 },
    /// The requested heading was unknown; scrolled to the first one instead.
    Fallback { requested: String, id: String, top: f64 },
    NoHeadings,
    EmptyId,
    /// No rendered element matches the heading.
    Unresolved { id: String },
    ContainerMissing,
}

impl NavigationOutcome {
    pub const fn scrolled(&self) -> bool {
        matches!(self, Self::Navigated { .. } | Self::Fallback { .. })
    }
}

/// A navigation that reached its settle deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    pub id: String,
    pub propagations: Vec<Propagation>,
}

#[derive(Debug, Clone)]
struct InFlight {
    heading_id: String,
    element_id: String,
    target_key: String,
    settle_at: u64,
}

/// Drives the preview to a heading and owns the active heading until the
/// scroll settles.
#[derive(Debug, Clone, Default)]
pub struct TocNavigator {
    config: NavigatorConfig,
    in_flight: Option<InFlight>,
}

impl TocNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            in_flight: None,
        }
    }

    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub const fn is_navigating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn settle_deadline(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|n| n.settle_at)
    }

    /// Scroll `target_key` so heading `id` sits `fixed_offset` below the top.
    pub fn scroll_to_heading(
        &mut self,
        id: &str,
        toc: &mut TocState,
        layout: &dyn PreviewLayout,
        sync: &mut SyncCoordinator,
        target_key: &str,
        now_ms: u64,
    ) -> NavigationOutcome {
        let id = id.trim();
        if id.is_empty() {
            tracing::warn!("navigation requested without a heading id");
            return NavigationOutcome::EmptyId;
        }
        if toc.headings().is_empty() {
            tracing::warn!(id, "navigation requested but the document has no headings");
            return NavigationOutcome::NoHeadings;
        }
        let Some(viewport) = layout.viewport() else {
            tracing::warn!(id, "cannot navigate: preview container not found");
            return NavigationOutcome::ContainerMissing;
        };

        let elements = layout.heading_elements();
        let (heading_id, element, fallback) = match resolve(id, toc.headings().as_slice(), &elements) {
            Some((heading_id, element)) => (heading_id, element, false),
            None => {
                let Some(first) = toc.headings().first() else {
                    return NavigationOutcome::NoHeadings;
                };
                tracing::warn!(id, fallback = %first.id, "heading not found, using first heading");
                match find_element(first, &elements) {
                    Some(element) => (first.id.clone(), element, true),
                    None => {
                        tracing::warn!(id = %first.id, "no rendered element for heading");
                        return NavigationOutcome::Unresolved { id: id.to_string() };
                    }
                }
            }
        };

        let max = max_scroll(viewport.scroll_height, viewport.client_height);
        let top = (viewport.scroll_top + element.top - self.config.fixed_offset).clamp(0.0, max);
        let settle_at = now_ms.saturating_add(self.config.settle_ms);
        let Some(position) = sync.drive(target_key, top, ScrollBehavior::Smooth, settle_at) else {
            tracing::warn!(id, key = target_key, "cannot navigate: scroll target not registered");
            return NavigationOutcome::ContainerMissing;
        };

        toc.set_active(Some(heading_id.clone()));
        tracing::debug!(id = %heading_id, top = position.top, "navigating to heading");
        self.in_flight = Some(InFlight {
            heading_id: heading_id.clone(),
            element_id: element.id.clone(),
            target_key: target_key.to_string(),
            settle_at,
        });

        if fallback {
            NavigationOutcome::Fallback {
                requested: id.to_string(),
                id: heading_id,
                top: position.top,
            }
        } else {
            NavigationOutcome::Navigated {
                id: heading_id,
                top: position.top,
            }
        }
    }

    /// Finish a navigation whose settle deadline has passed.
    ///
    /// Releases the driven target, re-confirms the active heading and
    /// propagates the settled position once.
    pub fn tick(
        &mut self,
        toc: &mut TocState,
        layout: &dyn PreviewLayout,
        sync: &mut SyncCoordinator,
        now_ms: u64,
    ) -> Option<Settled> {
        if self.in_flight.as_ref()?.settle_at > now_ms {
            return None;
        }
        let done = self.in_flight.take()?;
        sync.release(&done.target_key);
        toc.set_active(Some(done.heading_id.clone()));

        let visible = layout.viewport().is_some_and(|viewport| {
            layout
                .heading_elements()
                .iter()
                .find(|e| e.id == done.element_id)
                .is_some_and(|e| e.top + e.height > 0.0 && e.top < viewport.client_height)
        });
        if !visible {
            tracing::warn!(id = %done.heading_id, "heading not in view after navigation settled");
        }

        let propagations = sync
            .position(&done.target_key)
            .map(|position| sync.sync_all(&done.target_key, position, now_ms))
            .unwrap_or_default();
        Some(Settled {
            id: done.heading_id,
            propagations,
        })
    }

    /// Abandon the current navigation and release its target.
    pub fn cancel(&mut self, sync: &mut SyncCoordinator) {
        if let Some(done) = self.in_flight.take() {
            sync.release(&done.target_key);
        }
    }
}

fn find_element(heading: &Heading, elements: &[HeadingElement]) -> Option<HeadingElement> {
    if let Some(element) = elements.iter().find(|e| e.id == heading.id) {
        return Some(element.clone());
    }
    let wanted = normalize_heading_text(&heading.text);
    elements
        .iter()
        .find(|e| normalize_heading_text(&e.text) == wanted || slugify(&e.text) == heading.id)
        .cloned()
}

/// Resolve a requested id to a listed heading id and its rendered element.
fn resolve(id: &str, headings: &[Heading], elements: &[HeadingElement]) -> Option<(String, HeadingElement)> {
    let listed = headings.iter().find(|h| h.id == id);
    if let Some(element) = elements.iter().find(|e| e.id == id) {
        let heading_id = listed.map_or_else(|| element.id.clone(), |h| h.id.clone());
        return Some((heading_id, element.clone()));
    }
    if let Some(heading) = listed
        && let Some(element) = find_element(heading, elements)
    {
        return Some((heading.id.clone(), element));
    }
    elements
        .iter()
        .find(|e| slugify(&e.text) == id)
        .map(|e| (id.to_string(), e.clone()))
}
