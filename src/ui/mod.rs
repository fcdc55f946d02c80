//! Terminal rendering.
//!
//! This module handles:
//! - Splitting the screen into TOC, source, preview and status regions
//! - Scrollable panes and their sync adapters ([`pane`])
//! - Styling markdown rows for the terminal

mod overlays;
pub mod pane;
mod render;
mod status;
pub mod style;

pub use pane::{Pane, PaneHandle, PreviewGeometry};
pub use render::{Areas, preview_text_area, render, source_text_area, split_areas};
pub use status::status_text;

/// Columns between the preview border and its text.
pub const PREVIEW_LEFT_PADDING: u16 = 1;

/// Share of the width taken by the contents sidebar when shown.
pub const TOC_WIDTH_PERCENT: u16 = 25;
