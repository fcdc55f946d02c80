//! Propagation of scroll positions between registered targets.

use std::collections::{BTreeMap, HashMap};

use super::debounce::Debouncer;
use super::position::ScrollPosition;
use super::target::{ScrollBehavior, ScrollInsets, ScrollTarget, ScrollUpdate};

/// Key of the source text pane.
pub const EDITOR: &str = "editor";
/// Key of the rendered preview pane.
pub const PREVIEW: &str = "preview";
/// Shortest debounce accepted; a zero debounce would leave no guard window
/// for the echo of a programmatic scroll.
pub const MIN_DEBOUNCE_MS: u64 = 1;

/// Tuning for scroll synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub enabled: bool,
    pub smooth_scroll: bool,
    /// Multiplier applied to the source percentage before it reaches a target
    pub sync_ratio: f64,
    /// Quiet period before a burst of scroll events is propagated
    pub debounce_ms: u64,
    /// Longest a continuous burst may go without propagating
    pub max_wait_ms: Option<u64>,
    pub offset_top: f64,
    pub offset_bottom: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smooth_scroll: true,
            sync_ratio: 1.0,
            debounce_ms: 16,
            max_wait_ms: Some(64),
            offset_top: 0.0,
            offset_bottom: 0.0,
        }
    }
}

impl SyncConfig {
    /// Guard window during which a just-driven target ignores its own scroll events.
    pub const fn guard_ms(&self) -> u64 {
        let debounce = if self.debounce_ms < MIN_DEBOUNCE_MS {
            MIN_DEBOUNCE_MS
        } else {
            self.debounce_ms
        };
        debounce.saturating_mul(2)
    }

    const fn insets(&self) -> ScrollInsets {
        ScrollInsets {
            top: self.offset_top,
            bottom: self.offset_bottom,
        }
    }

    const fn behavior(&self) -> ScrollBehavior {
        if self.smooth_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }
}

/// A partial change to [`SyncConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncConfigUpdate {
    pub enabled: Option<bool>,
    pub smooth_scroll: Option<bool>,
    pub sync_ratio: Option<f64>,
    pub debounce_ms: Option<u64>,
    pub max_wait_ms: Option<Option<u64>>,
    pub offset_top: Option<f64>,
    pub offset_bottom: Option<f64>,
}

/// Handle returned by [`SyncCoordinator::register_target`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    key: String,
    generation: u64,
}

impl Registration {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// One position written to one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    pub source: String,
    pub target: String,
    pub position: ScrollPosition,
}

struct Entry {
    target: Box<dyn ScrollTarget>,
    generation: u64,
    debouncer: Debouncer<ScrollPosition>,
}

/// Keeps registered scroll targets in step with each other.
///
/// Scroll events enter through [`on_scroll`](Self::on_scroll) and are
/// debounced per source. When a burst settles, [`tick`](Self::tick) writes the
/// source's percentage to every other target and marks each one in-flight for
/// a short guard window, so the scroll event produced by that write is not
/// mistaken for the user scrolling it.
pub struct SyncCoordinator {
    config: SyncConfig,
    targets: BTreeMap<String, Entry>,
    in_flight: HashMap<String, u64>,
    last_positions: HashMap<String, ScrollPosition>,
    next_generation: u64,
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("config", &self.config)
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl SyncCoordinator {
    pub fn new(mut config: SyncConfig) -> Self {
        config.debounce_ms = config.debounce_ms.max(MIN_DEBOUNCE_MS);
        Self {
            config,
            targets: BTreeMap::new(),
            in_flight: HashMap::new(),
            last_positions: HashMap::new(),
            next_generation: 0,
        }
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Apply a partial configuration change.
    pub fn update_config(&mut self, update: SyncConfigUpdate) {
        if let Some(smooth) = update.smooth_scroll {
            self.config.smooth_scroll = smooth;
        }
        if let Some(ratio) = update.sync_ratio {
            self.config.sync_ratio = ratio;
        }
        if let Some(top) = update.offset_top {
            self.config.offset_top = top;
        }
        if let Some(bottom) = update.offset_bottom {
            self.config.offset_bottom = bottom;
        }
        let timing_changed = update.debounce_ms.is_some() || update.max_wait_ms.is_some();
        if let Some(debounce) = update.debounce_ms {
            self.config.debounce_ms = debounce.max(MIN_DEBOUNCE_MS);
        }
        if let Some(max_wait) = update.max_wait_ms {
            self.config.max_wait_ms = max_wait;
        }
        if timing_changed {
            for entry in self.targets.values_mut() {
                entry
                    .debouncer
                    .set_timing(self.config.debounce_ms, self.config.max_wait_ms);
            }
        }
        if let Some(enabled) = update.enabled {
            self.set_enabled(enabled);
        }
    }

    /// Turn synchronization on or off.
    ///
    /// Disabling drops every in-flight marker and pending propagation.
    /// Positions that were already applied stay where they are.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.in_flight.clear();
            for entry in self.targets.values_mut() {
                entry.debouncer.cancel();
            }
        }
        tracing::debug!(enabled, "scroll sync toggled");
    }

    /// Flip the enabled state, returning the new value.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.config.enabled);
        self.config.enabled
    }

    /// Add a target under `key`, replacing any target already registered there.
    pub fn register_target(
        &mut self,
        key: impl Into<String>,
        target: Box<dyn ScrollTarget>,
    ) -> Registration {
        let key = key.into();
        self.next_generation += 1;
        let generation = self.next_generation;
        let debouncer = Debouncer::new(self.config.debounce_ms).with_max_wait(self.config.max_wait_ms);
        let previous = self.targets.insert(
            key.clone(),
            Entry {
                target,
                generation,
                debouncer,
            },
        );
        self.in_flight.remove(&key);
        if previous.is_some() {
            tracing::debug!(key = %key, "replaced scroll target");
        }
        Registration { key, generation }
    }

    /// Remove the target behind `registration` if it is still the current one.
    pub fn unregister(&mut self, registration: &Registration) -> bool {
        let current = self
            .targets
            .get(&registration.key)
            .is_some_and(|entry| entry.generation == registration.generation);
        if !current {
            return false;
        }
        self.unregister_key(&registration.key)
    }

    pub fn unregister_key(&mut self, key: &str) -> bool {
        self.in_flight.remove(key);
        self.last_positions.remove(key);
        self.targets.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.targets.contains_key(key)
    }

    pub fn target_keys(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn is_in_flight(&self, key: &str, now_ms: u64) -> bool {
        self.in_flight
            .get(key)
            .is_some_and(|release_at| now_ms < *release_at)
    }

    /// Live position of a target.
    pub fn position(&self, key: &str) -> Option<ScrollPosition> {
        self.targets.get(key)?.target.scroll_position()
    }

    /// Last position observed on, or written to, a target.
    pub fn last_position(&self, key: &str) -> Option<ScrollPosition> {
        self.last_positions.get(key).copied()
    }

    /// Handle a scroll event from a target.
    ///
    /// Returns false when the event was dropped: sync disabled, an echo of a
    /// programmatic scroll, an unknown key, or a missing container.
    ///
    /// While sync is disabled the position is still recorded, so a later
    /// [`restore`](Self::restore) puts the pane back where the user left it.
    pub fn on_scroll(&mut self, key: &str, now_ms: u64) -> bool {
        if self.is_in_flight(key, now_ms) {
            return false;
        }
        let Some(entry) = self.targets.get_mut(key) else {
            tracing::debug!(key, "scroll event from unregistered target");
            return false;
        };
        let Some(position) = entry.target.scroll_position() else {
            tracing::warn!(key, "scroll target has no scrollable container");
            return false;
        };
        self.last_positions.insert(key.to_string(), position);
        if !self.config.enabled {
            return false;
        }
        entry.debouncer.queue(position, now_ms);
        true
    }

    /// Queue `position` from `source` for debounced propagation.
    pub fn notify(&mut self, source: &str, position: ScrollPosition, now_ms: u64) {
        if !self.config.enabled {
            return;
        }
        if let Some(entry) = self.targets.get_mut(source) {
            entry.debouncer.queue(position, now_ms);
        } else {
            tracing::debug!(source, "notify from unregistered target");
        }
    }

    /// Release expired guards and flush settled propagations.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Propagation> {
        self.in_flight.retain(|_, release_at| now_ms < *release_at);
        let ready: Vec<(String, ScrollPosition)> = self
            .targets
            .iter_mut()
            .filter_map(|(key, entry)| {
                entry
                    .debouncer
                    .take_ready(now_ms)
                    .map(|position| (key.clone(), position))
            })
            .collect();
        ready
            .into_iter()
            .flat_map(|(source, position)| self.propagate(&source, position, now_ms))
            .collect()
    }

    /// Propagate immediately, bypassing the debounce.
    pub fn sync_all(&mut self, source: &str, position: ScrollPosition, now_ms: u64) -> Vec<Propagation> {
        if let Some(entry) = self.targets.get_mut(source) {
            entry.debouncer.cancel();
        }
        self.propagate(source, position, now_ms)
    }

    /// Write a position to one target under the usual guard.
    pub fn sync_to_target(&mut self, key: &str, update: &ScrollUpdate, now_ms: u64) -> bool {
        if !self.config.enabled {
            return false;
        }
        let insets = self.config.insets();
        let behavior = self.config.behavior();
        let release_at = now_ms.saturating_add(self.config.guard_ms());
        let Some(entry) = self.targets.get_mut(key) else {
            return false;
        };
        let Some(request) = entry.target.set_scroll_position(update, insets, behavior) else {
            tracing::warn!(key, "cannot sync: scroll target has no scrollable container");
            return false;
        };
        entry.debouncer.cancel();
        self.in_flight.insert(key.to_string(), release_at);
        if let Some(position) = entry.target.scroll_position() {
            self.last_positions.insert(key.to_string(), position);
        }
        tracing::trace!(key, top = ?request.top, "synced target");
        true
    }

    /// Put one target back at `percentage` after its own layout changed.
    ///
    /// Works whether or not sync is enabled and marks nothing in-flight;
    /// nothing is propagated.
    pub fn restore(&mut self, key: &str, percentage: f64) -> Option<ScrollPosition> {
        let insets = self.config.insets();
        let entry = self.targets.get_mut(key)?;
        entry.target.set_scroll_position(
            &ScrollUpdate::percentage(percentage),
            insets,
            ScrollBehavior::Instant,
        )?;
        entry.debouncer.cancel();
        let position = entry.target.scroll_position()?;
        self.last_positions.insert(key.to_string(), position);
        Some(position)
    }

    /// Scroll one target to an absolute offset and keep it in-flight until
    /// `hold_until_ms`, regardless of whether sync is enabled.
    pub fn drive(
        &mut self,
        key: &str,
        top: f64,
        behavior: ScrollBehavior,
        hold_until_ms: u64,
    ) -> Option<ScrollPosition> {
        let entry = self.targets.get_mut(key)?;
        entry.target.set_scroll_position(
            &ScrollUpdate::top(top),
            ScrollInsets::default(),
            behavior,
        )?;
        entry.debouncer.cancel();
        let position = entry.target.scroll_position()?;
        self.in_flight.insert(key.to_string(), hold_until_ms);
        self.last_positions.insert(key.to_string(), position);
        Some(position)
    }

    /// Mark a target in-flight until `until_ms`.
    pub fn hold(&mut self, key: &str, until_ms: u64) {
        if self.targets.contains_key(key) {
            self.in_flight.insert(key.to_string(), until_ms);
        }
    }

    pub fn release(&mut self, key: &str) {
        self.in_flight.remove(key);
    }

    /// Whether any debounce or guard timer is still running.
    pub fn has_pending_work(&self) -> bool {
        !self.in_flight.is_empty() || self.targets.values().any(|e| e.debouncer.is_pending())
    }

    fn propagate(&mut self, source: &str, position: ScrollPosition, now_ms: u64) -> Vec<Propagation> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.last_positions.insert(source.to_string(), position);
        let percentage = (position.percentage * self.config.sync_ratio).clamp(0.0, 1.0);
        let update = ScrollUpdate {
            top: None,
            left: Some(position.left),
            percentage: Some(percentage),
        };
        let insets = self.config.insets();
        let behavior = self.config.behavior();
        let release_at = now_ms.saturating_add(self.config.guard_ms());

        let mut applied = Vec::new();
        for (key, entry) in &mut self.targets {
            if key == source
                || self
                    .in_flight
                    .get(key)
                    .is_some_and(|release| now_ms < *release)
            {
                continue;
            }
            let Some(metrics) = entry.target.metrics() else {
                tracing::warn!(key = %key, "skipping sync: scroll target has no scrollable container");
                continue;
            };
            if !metrics.has_overflow() {
                continue;
            }
            if entry
                .target
                .set_scroll_position(&update, insets, behavior)
                .is_none()
            {
                tracing::warn!(key = %key, "skipping sync: scroll target rejected the position");
                continue;
            }
            self.in_flight.insert(key.clone(), release_at);
            let written = entry.target.scroll_position().unwrap_or(ScrollPosition {
                percentage,
                ..position
            });
            self.last_positions.insert(key.clone(), written);
            applied.push(Propagation {
                source: source.to_string(),
                target: key.clone(),
                position: written,
            });
        }
        if !applied.is_empty() {
            tracing::trace!(source, percentage, targets = applied.len(), "scroll propagated");
        }
        applied
    }
}
