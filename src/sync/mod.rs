//! Scroll synchronization between panes.
//!
//! - [`position`]: raw metrics to normalized position and back
//! - [`target`]: the [`ScrollTarget`] capability panes implement
//! - [`coordinator`]: debounced, feedback-free propagation
//! - [`debounce`]: the polled debouncer behind it

pub mod coordinator;
pub mod debounce;
pub mod position;
pub mod target;

pub use coordinator::{
    EDITOR, MIN_DEBOUNCE_MS, PREVIEW, Propagation, Registration, SyncConfig, SyncConfigUpdate,
    SyncCoordinator,
};
pub use position::{ScrollMetrics, ScrollPosition, to_percentage, to_scroll_top};
pub use target::{ScrollBehavior, ScrollInsets, ScrollRequest, ScrollTarget, ScrollUpdate};
