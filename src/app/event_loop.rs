use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, warn};

use crate::app::{App, Message, Model, input, update};
use crate::sync::debounce::Debouncer;
use crate::watcher::{FileWatcher, RELOAD_DEBOUNCE};

/// Quiet period before a burst of resize events is applied.
const RESIZE_DEBOUNCE_MS: u64 = 100;
/// Poll interval while timers or animations are running (about 60 fps).
const ACTIVE_POLL_MS: u64 = 16;
const IDLE_POLL_MS: u64 = 250;

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the main event loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the terminal cannot be
    /// initialized, or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let source = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("failed to read {}", self.file_path.display()))?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; marksync requires an interactive terminal")?;
        let size = terminal.size()?;

        let model = Model::new(
            self.file_path.clone(),
            source,
            self.settings.clone(),
            (size.width, size.height),
            self.toc_visible,
        )
        .map(|model| model.with_settings_path(self.settings_path.clone()));

        let result = match model {
            Ok(mut model) => {
                model.watch_enabled = self.watch_enabled;
                execute!(stdout(), EnableMouseCapture)
                    .map_err(anyhow::Error::from)
                    .and_then(|()| Self::event_loop(&mut terminal, &mut model))
            }
            Err(err) => Err(err),
        };

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn make_file_watcher(model: &mut Model) -> Option<FileWatcher> {
        if !model.watch_enabled {
            return None;
        }
        match FileWatcher::new(&model.file_path, RELOAD_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                warn!(path = %model.file_path.display(), %err, "file watching unavailable");
                model.watch_enabled = false;
                model.show_message(format!("Watch unavailable: {err}"), 0);
                None
            }
        }
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer: Debouncer<(u16, u16)> = Debouncer::new(RESIZE_DEBOUNCE_MS);
        let mut file_watcher = Self::make_file_watcher(model);
        let mut needs_render = true;

        loop {
            let now_ms = elapsed_ms(start);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                debug!(width, height, "applying resize");
                update(model, Message::Resize(width, height), now_ms);
                needs_render = true;
            }

            if file_watcher.as_mut().is_some_and(FileWatcher::take_change_ready) {
                debug!(path = %model.file_path.display(), "file changed on disk");
                update(model, Message::FileChanged, now_ms);
                needs_render = true;
            }

            if model.tick(now_ms) {
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }
            if model.should_quit {
                break;
            }

            let busy = model.has_pending_work()
                || resize_debouncer.is_pending()
                || file_watcher.as_ref().is_some_and(FileWatcher::is_pending);
            let poll_ms = if busy { ACTIVE_POLL_MS } else { IDLE_POLL_MS };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce key repeat bursts into a single frame.
                loop {
                    let event_ms = elapsed_ms(start);
                    let event = event::read()?;
                    if let Some(msg) = input::handle_event(&event, model, event_ms, &mut resize_debouncer) {
                        debug!(?msg, "message");
                        update(model, msg, event_ms);
                        needs_render = true;
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
