//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions, driven by an explicit clock
//! - [`App::run`]: Main event loop with rendering

mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, Model};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::Settings;

/// Owns the startup options and runs the terminal UI.
#[derive(Debug)]
pub struct App {
    file_path: PathBuf,
    settings: Settings,
    settings_path: Option<PathBuf>,
    watch_enabled: bool,
    toc_visible: bool,
}

impl App {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            settings: Settings::default(),
            settings_path: None,
            watch_enabled: false,
            toc_visible: true,
        }
    }

    /// Start with `settings`; runtime changes are auto-saved to `path` when given.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings, path: Option<PathBuf>) -> Self {
        self.settings = settings;
        self.settings_path = path;
        self
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Set initial TOC visibility.
    #[must_use]
    pub const fn with_toc_visible(mut self, visible: bool) -> Self {
        self.toc_visible = visible;
        self
    }
}
