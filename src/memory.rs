//! In-memory scroll surfaces.
//!
//! [`MemoryTarget`] and [`MemoryLayout`] stand in for real panes in headless
//! hosts and tests. Clones share state, so a test can hand one clone to the
//! coordinator and keep another to inspect or drive it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::sync::position::{ScrollMetrics, max_scroll};
use crate::sync::target::{ScrollRequest, ScrollTarget};
use crate::toc::observer::{HeadingElement, PreviewLayout};

/// Queue of target keys whose programmatic scroll produced a scroll event.
pub type EchoQueue = Rc<RefCell<VecDeque<String>>>;

#[derive(Debug, Default)]
struct MemoryState {
    scroll_top: f64,
    scroll_left: f64,
    scroll_height: f64,
    client_height: f64,
    attached: bool,
    requests: Vec<ScrollRequest>,
    echo: Option<(String, EchoQueue)>,
}

/// A scrollable region held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTarget {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(MemoryState {
                scroll_height,
                client_height,
                attached: true,
                ..MemoryState::default()
            })),
        }
    }

    /// A target whose container has not been mounted.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Report every programmatic scroll as a scroll event for `key`.
    #[must_use]
    pub fn with_echo(self, key: impl Into<String>, queue: EchoQueue) -> Self {
        self.state.borrow_mut().echo = Some((key.into(), queue));
        self
    }

    pub fn scroll_top(&self) -> f64 {
        self.state.borrow().scroll_top
    }

    /// Move the region as a user would, without recording a request.
    pub fn set_scroll_top(&self, top: f64) {
        let mut state = self.state.borrow_mut();
        let max = max_scroll(state.scroll_height, state.client_height);
        state.scroll_top = top.clamp(0.0, max);
    }

    pub fn set_dimensions(&self, scroll_height: f64, client_height: f64) {
        let mut state = self.state.borrow_mut();
        state.scroll_height = scroll_height;
        state.client_height = client_height;
        let max = max_scroll(scroll_height, client_height);
        state.scroll_top = state.scroll_top.min(max);
    }

    pub fn set_attached(&self, attached: bool) {
        self.state.borrow_mut().attached = attached;
    }

    pub fn requests(&self) -> Vec<ScrollRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }
}

impl ScrollTarget for MemoryTarget {
    fn metrics(&self) -> Option<ScrollMetrics> {
        let state = self.state.borrow();
        state.attached.then(|| ScrollMetrics {
            scroll_top: state.scroll_top,
            scroll_left: state.scroll_left,
            scroll_height: state.scroll_height,
            client_height: state.client_height,
        })
    }

    fn scroll_to(&mut self, request: ScrollRequest) {
        let mut state = self.state.borrow_mut();
        if !state.attached {
            return;
        }
        let max = max_scroll(state.scroll_height, state.client_height);
        if let Some(top) = request.top {
            state.scroll_top = top.clamp(0.0, max);
        }
        if let Some(left) = request.left {
            state.scroll_left = left.max(0.0);
        }
        state.requests.push(request);
        if let Some((key, queue)) = &state.echo {
            queue.borrow_mut().push_back(key.clone());
        }
    }
}

/// A heading placed at a fixed offset within the content.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedHeading {
    pub id: String,
    pub text: String,
    pub offset: f64,
    pub height: f64,
}

/// A rendered document laid out inside a [`MemoryTarget`].
#[derive(Debug, Clone)]
pub struct MemoryLayout {
    container: MemoryTarget,
    headings: Rc<RefCell<Vec<PlacedHeading>>>,
}

impl MemoryLayout {
    pub fn new(container: MemoryTarget) -> Self {
        Self {
            container,
            headings: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_heading(self, id: &str, text: &str, offset: f64) -> Self {
        self.headings.borrow_mut().push(PlacedHeading {
            id: id.to_string(),
            text: text.to_string(),
            offset,
            height: 30.0,
        });
        self
    }

    pub fn container(&self) -> &MemoryTarget {
        &self.container
    }

    pub fn set_headings(&self, headings: Vec<PlacedHeading>) {
        *self.headings.borrow_mut() = headings;
    }
}

impl PreviewLayout for MemoryLayout {
    fn viewport(&self) -> Option<ScrollMetrics> {
        self.container.metrics()
    }

    fn heading_elements(&self) -> Vec<HeadingElement> {
        let Some(metrics) = self.container.metrics() else {
            return Vec::new();
        };
        self.headings
            .borrow()
            .iter()
            .map(|h| HeadingElement {
                id: h.id.clone(),
                text: h.text.clone(),
                top: h.offset - metrics.scroll_top,
                height: h.height,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::target::ScrollBehavior;

    #[test]
    fn test_clones_share_state() {
        let target = MemoryTarget::new(1000.0, 100.0);
        let mut handle = target.clone();
        handle.scroll_to(ScrollRequest {
            top: Some(250.0),
            left: None,
            behavior: ScrollBehavior::Instant,
        });
        assert_eq!(target.scroll_top(), 250.0);
        assert_eq!(target.request_count(), 1);
    }

    #[test]
    fn test_detached_target_has_no_metrics() {
        assert!(MemoryTarget::detached().metrics().is_none());
    }

    #[test]
    fn test_echo_reports_programmatic_scrolls() {
        let queue = EchoQueue::default();
        let mut target = MemoryTarget::new(1000.0, 100.0).with_echo("preview", queue.clone());
        target.scroll_to(ScrollRequest {
            top: Some(10.0),
            ..ScrollRequest::default()
        });
        assert_eq!(queue.borrow_mut().pop_front().as_deref(), Some("preview"));
    }

    #[test]
    fn test_layout_positions_follow_scroll() {
        let target = MemoryTarget::new(2000.0, 400.0);
        let layout = MemoryLayout::new(target.clone()).with_heading("intro", "Intro", 500.0);
        target.set_scroll_top(300.0);
        let elements = layout.heading_elements();
        assert_eq!(elements[0].top, 200.0);
    }
}
