// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. sync::SyncConfig)
    clippy::module_name_repetitions
)]

//! # Marksync
//!
//! A split-pane terminal markdown previewer with synchronized scrolling.
//!
//! The core is host-agnostic: panes are anything implementing
//! [`sync::ScrollTarget`], and every timer is polled with an explicit
//! millisecond clock, so the same logic drives the terminal UI and the
//! headless [`memory`] surfaces used in tests.
//!
//! ## Modules
//!
//! - [`sync`]: Percentage-based scroll synchronization between panes
//! - [`toc`]: Heading list, active-heading detection and TOC navigation
//! - [`session`]: One document's coordinator, observer and navigator
//! - [`memory`]: In-memory scroll surfaces
//! - [`document`]: Markdown parsing and source layout
//! - [`config`]: Persisted settings
//! - [`watcher`]: File watching
//! - [`app`]: Terminal application (The Elm Architecture)
//! - [`ui`]: Terminal rendering and pane adapters

pub mod app;
pub mod config;
pub mod document;
pub mod memory;
pub mod session;
pub mod sync;
pub mod toc;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::config::Settings;
    pub use crate::document::Document;
    pub use crate::session::SyncSession;
    pub use crate::sync::{EDITOR, PREVIEW, ScrollTarget, SyncConfig, SyncCoordinator};
    pub use crate::toc::{Heading, PreviewLayout};
}
