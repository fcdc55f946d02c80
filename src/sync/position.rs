//! Conversion between raw scroll metrics and normalized positions.
//!
//! Every pane scrolls over its own range, so positions are exchanged as a
//! fraction of that range. These functions are pure and never fail; out of
//! range input is clamped.

/// Largest valid scroll offset for a region.
pub fn max_scroll(scroll_height: f64, client_height: f64) -> f64 {
    let max = scroll_height - client_height;
    if max.is_finite() { max.max(0.0) } else { 0.0 }
}

/// Convert a scroll offset into a fraction of the scrollable range.
///
/// Returns 0 when the content fits without scrolling.
///
/// # Example
///
/// ```
/// use marksync::sync::position::to_percentage;
///
/// assert_eq!(to_percentage(50.0, 200.0, 100.0), 0.5);
/// assert_eq!(to_percentage(50.0, 80.0, 100.0), 0.0);
/// ```
pub fn to_percentage(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let max = max_scroll(scroll_height, client_height);
    if max <= 0.0 || !scroll_top.is_finite() {
        return 0.0;
    }
    (scroll_top / max).clamp(0.0, 1.0)
}

/// Convert a fraction of the scrollable range back into a scroll offset.
pub fn to_scroll_top(percentage: f64, scroll_height: f64, client_height: f64) -> f64 {
    let max = max_scroll(scroll_height, client_height);
    if !percentage.is_finite() {
        return 0.0;
    }
    (percentage * max).clamp(0.0, max)
}

/// Raw measurements of a scrollable region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current vertical offset
    pub scroll_top: f64,
    /// Current horizontal offset
    pub scroll_left: f64,
    /// Total content height
    pub scroll_height: f64,
    /// Visible height
    pub client_height: f64,
}

impl ScrollMetrics {
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_left: 0.0,
            scroll_height,
            client_height,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        max_scroll(self.scroll_height, self.client_height)
    }

    /// Whether the content is taller than the visible area.
    pub fn has_overflow(&self) -> bool {
        self.max_scroll() > 0.0
    }

    pub fn position(&self) -> ScrollPosition {
        ScrollPosition::from_metrics(self)
    }
}

/// A scroll position expressed both absolutely and relative to the range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    pub top: f64,
    pub left: f64,
    /// Fraction of the scrollable range, always within `0.0..=1.0`
    pub percentage: f64,
}

impl ScrollPosition {
    pub fn from_metrics(metrics: &ScrollMetrics) -> Self {
        Self {
            top: metrics.scroll_top.max(0.0),
            left: metrics.scroll_left.max(0.0),
            percentage: to_percentage(
                metrics.scroll_top,
                metrics.scroll_height,
                metrics.client_height,
            ),
        }
    }

    /// A position known only by its fraction of the range.
    pub const fn at_percentage(percentage: f64) -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_midpoint() {
        assert!((to_percentage(450.0, 1000.0, 100.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_without_overflow_is_zero() {
        assert_eq!(to_percentage(0.0, 100.0, 100.0), 0.0);
        assert_eq!(to_percentage(30.0, 50.0, 100.0), 0.0);
    }

    #[test]
    fn test_percentage_clamps_past_end() {
        assert_eq!(to_percentage(5000.0, 1000.0, 100.0), 1.0);
    }

    #[test]
    fn test_percentage_ignores_nan() {
        assert_eq!(to_percentage(f64::NAN, 1000.0, 100.0), 0.0);
    }

    #[test]
    fn test_scroll_top_clamps_to_range() {
        assert_eq!(to_scroll_top(2.0, 1000.0, 100.0), 900.0);
        assert_eq!(to_scroll_top(-1.0, 1000.0, 100.0), 0.0);
    }

    #[test]
    fn test_scroll_top_without_overflow_is_zero() {
        assert_eq!(to_scroll_top(0.7, 80.0, 100.0), 0.0);
    }

    #[test]
    fn test_metrics_position() {
        let metrics = ScrollMetrics::new(225.0, 1000.0, 100.0);
        let pos = metrics.position();
        assert_eq!(pos.top, 225.0);
        assert!((pos.percentage - 0.25).abs() < 1e-9);
        assert!(metrics.has_overflow());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn round_trip_within_tolerance(
                height in 1.0..100_000.0f64,
                client in 1.0..5_000.0f64,
                fraction in 0.0..=1.0f64,
            ) {
                let max = max_scroll(height, client);
                let top = max * fraction;
                let back = to_scroll_top(to_percentage(top, height, client), height, client);
                prop_assert!((back - top).abs() < 1e-6);
            }

            #[test]
            fn percentage_always_in_unit_range(
                top in 0.0..1_000_000.0f64,
                height in 0.0..100_000.0f64,
                client in 0.0..100_000.0f64,
            ) {
                let p = to_percentage(top, height, client);
                prop_assert!((0.0..=1.0).contains(&p));
                if height <= client {
                    prop_assert_eq!(p, 0.0);
                }
            }
        }
    }
}
