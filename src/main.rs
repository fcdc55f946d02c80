//! Marksync - a split-pane terminal markdown previewer with synchronized scrolling.
//!
//! # Usage
//!
//! ```bash
//! marksync README.md
//! marksync --watch README.md
//! marksync --no-sync --no-toc README.md
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use marksync::app::App;
use marksync::config::{
    SettingsOverrides, ThemeMode, load_or_default, reset_settings, save_settings, settings_path,
};

/// A split-pane terminal markdown previewer with synchronized scrolling
#[derive(Parser, Debug)]
#[command(name = "marksync", version, about, long_about = None)]
struct Cli {
    /// Markdown file to view
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Hide table of contents sidebar
    #[arg(long, conflicts_with = "toc")]
    no_toc: bool,

    /// Start with TOC sidebar visible
    #[arg(long)]
    toc: bool,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Start with scroll synchronization disabled
    #[arg(long)]
    no_sync: bool,

    /// Jump instead of animating synchronized scrolls
    #[arg(long)]
    no_smooth: bool,

    /// Disable word wrap in the source pane
    #[arg(long)]
    no_wrap: bool,

    /// Hide source line numbers
    #[arg(long)]
    no_line_numbers: bool,

    /// Scroll sync debounce in milliseconds
    #[arg(long, value_name = "MS")]
    debounce: Option<u64>,

    /// Fraction of the scroll position transferred between panes (0.0 to 1.0)
    #[arg(long, value_name = "RATIO")]
    sync_ratio: Option<f64>,

    /// Save the effective settings as defaults
    #[arg(long)]
    save: bool,

    /// Delete saved settings before starting
    #[arg(long)]
    reset: bool,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            theme: self.theme,
            word_wrap: self.no_wrap.then_some(false),
            show_line_numbers: self.no_line_numbers.then_some(false),
            sync_enabled: self.no_sync.then_some(false),
            smooth_scroll: self.no_smooth.then_some(false),
            sync_ratio: self.sync_ratio,
            debounce_ms: self.debounce,
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let path = settings_path();
    if cli.reset {
        reset_settings(&path)
            .with_context(|| format!("failed to reset settings at {}", path.display()))?;
    }

    let mut settings = load_or_default(&path);
    let overrides = cli.overrides();
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "applying command-line overrides");
        overrides.apply(&mut settings);
    }
    if cli.save {
        save_settings(&path, &settings)
            .with_context(|| format!("failed to save settings to {}", path.display()))?;
    }

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let mut app = App::new(cli.file)
        .with_settings(settings, Some(path))
        .with_watch(cli.watch)
        .with_toc_visible(cli.toc || !cli.no_toc);

    app.run().context("Application error")
}
