//! Scrollable endpoints and the requests used to move them.

use super::position::{ScrollMetrics, ScrollPosition, max_scroll};

/// How a programmatic scroll should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    Smooth,
    #[default]
    Instant,
}

/// A fully resolved scroll command for one target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollRequest {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub behavior: ScrollBehavior,
}

/// A partial position to apply to a target.
///
/// When `percentage` is present it wins over `top` and is mapped onto the
/// destination's own scroll range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollUpdate {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub percentage: Option<f64>,
}

impl ScrollUpdate {
    pub const fn top(top: f64) -> Self {
        Self {
            top: Some(top),
            left: None,
            percentage: None,
        }
    }

    pub const fn percentage(percentage: f64) -> Self {
        Self {
            top: None,
            left: None,
            percentage: Some(percentage),
        }
    }
}

impl From<ScrollPosition> for ScrollUpdate {
    fn from(position: ScrollPosition) -> Self {
        Self {
            top: Some(position.top),
            left: Some(position.left),
            percentage: Some(position.percentage),
        }
    }
}

/// Padding excluded from percentage mapping at each end of a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInsets {
    pub top: f64,
    pub bottom: f64,
}

/// Resolve a partial update against a target's current metrics.
pub fn resolve_update(
    update: &ScrollUpdate,
    metrics: &ScrollMetrics,
    insets: ScrollInsets,
    behavior: ScrollBehavior,
) -> ScrollRequest {
    let max = max_scroll(metrics.scroll_height, metrics.client_height);
    let top = match (update.percentage, update.top) {
        (Some(percentage), _) => {
            let span = (max - insets.top - insets.bottom).max(0.0);
            Some(insets.top + percentage.clamp(0.0, 1.0) * span)
        }
        (None, Some(top)) => Some(top + insets.top),
        (None, None) => None,
    };
    ScrollRequest {
        top: top.map(|t| if t.is_finite() { t.clamp(0.0, max) } else { 0.0 }),
        left: update.left.map(|l| l.max(0.0)),
        behavior,
    }
}

/// A scrollable endpoint taking part in synchronization.
///
/// Implementations wrap whatever actually scrolls: a terminal pane, a DOM
/// container, an in-memory fake.
pub trait ScrollTarget {
    /// Current measurements, or `None` when the scrollable container is gone.
    fn metrics(&self) -> Option<ScrollMetrics>;

    /// Apply a resolved scroll command.
    fn scroll_to(&mut self, request: ScrollRequest);

    fn scroll_position(&self) -> Option<ScrollPosition> {
        self.metrics().map(|metrics| metrics.position())
    }

    /// Resolve and apply a partial position. Returns the request that was
    /// issued, or `None` if the container is missing.
    fn set_scroll_position(
        &mut self,
        update: &ScrollUpdate,
        insets: ScrollInsets,
        behavior: ScrollBehavior,
    ) -> Option<ScrollRequest> {
        let metrics = self.metrics()?;
        let request = resolve_update(update, &metrics, insets, behavior);
        self.scroll_to(request);
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_wins_over_top() {
        let metrics = ScrollMetrics::new(0.0, 1100.0, 100.0);
        let update = ScrollUpdate {
            top: Some(10.0),
            left: None,
            percentage: Some(0.5),
        };
        let req = resolve_update(&update, &metrics, ScrollInsets::default(), ScrollBehavior::Instant);
        assert_eq!(req.top, Some(500.0));
    }

    #[test]
    fn test_insets_shrink_percentage_span() {
        let metrics = ScrollMetrics::new(0.0, 1100.0, 100.0);
        let insets = ScrollInsets {
            top: 100.0,
            bottom: 100.0,
        };
        let req = resolve_update(
            &ScrollUpdate::percentage(0.5),
            &metrics,
            insets,
            ScrollBehavior::Smooth,
        );
        assert_eq!(req.top, Some(500.0));
        let req = resolve_update(&ScrollUpdate::percentage(0.0), &metrics, insets, ScrollBehavior::Smooth);
        assert_eq!(req.top, Some(100.0));
        assert_eq!(req.behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn test_absolute_top_is_clamped() {
        let metrics = ScrollMetrics::new(0.0, 300.0, 100.0);
        let req = resolve_update(
            &ScrollUpdate::top(900.0),
            &metrics,
            ScrollInsets::default(),
            ScrollBehavior::Instant,
        );
        assert_eq!(req.top, Some(200.0));
        let req = resolve_update(
            &ScrollUpdate::top(-20.0),
            &metrics,
            ScrollInsets::default(),
            ScrollBehavior::Instant,
        );
        assert_eq!(req.top, Some(0.0));
    }
}
