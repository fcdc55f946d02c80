//! Persisted user settings.
//!
//! Settings live in a single JSON file under the platform config directory.
//! Files may be partial; missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sync::coordinator::{MIN_DEBOUNCE_MS, SyncConfig, SyncConfigUpdate};

/// File name of the settings store.
pub const SETTINGS_FILE: &str = "markdown-previewer-settings.json";
const APP_DIR: &str = "marksync";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write settings {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings")]
    Encode(#[from] serde_json::Error),
}

#[derive(clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Next mode in the runtime toggle order: light, dark, system.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
}

/// Scroll synchronization preferences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub enabled: bool,
    pub smooth_scroll: bool,
    pub sync_ratio: f64,
    pub debounce_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let config = SyncConfig::default();
        Self {
            enabled: config.enabled,
            smooth_scroll: config.smooth_scroll,
            sync_ratio: config.sync_ratio,
            debounce_ms: config.debounce_ms,
        }
    }
}

impl SyncSettings {
    /// Coordinator update carrying these preferences. Max-wait follows the
    /// debounce at four times its length.
    pub fn to_update(&self) -> SyncConfigUpdate {
        let debounce = self.debounce_ms.max(MIN_DEBOUNCE_MS);
        SyncConfigUpdate {
            enabled: Some(self.enabled),
            smooth_scroll: Some(self.smooth_scroll),
            sync_ratio: Some(self.sync_ratio.clamp(0.0, 1.0)),
            debounce_ms: Some(debounce),
            max_wait_ms: Some(Some(debounce.saturating_mul(4))),
            ..SyncConfigUpdate::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: ThemeMode,
    pub preview_theme: String,
    pub font_size: u16,
    pub show_line_numbers: bool,
    pub word_wrap: bool,
    pub auto_save: bool,
    /// Milliseconds between automatic saves
    pub auto_save_interval: u64,
    pub table_zebra_stripes: bool,
    pub table_alignment_indicators: bool,
    pub sync: SyncSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            preview_theme: "default".to_string(),
            font_size: 14,
            show_line_numbers: true,
            word_wrap: true,
            auto_save: true,
            auto_save_interval: 5000,
            table_zebra_stripes: false,
            table_alignment_indicators: true,
            sync: SyncSettings::default(),
        }
    }
}

/// Values given on the command line, applied over the stored settings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SettingsOverrides {
    pub theme: Option<ThemeMode>,
    pub word_wrap: Option<bool>,
    pub show_line_numbers: Option<bool>,
    pub sync_enabled: Option<bool>,
    pub smooth_scroll: Option<bool>,
    pub sync_ratio: Option<f64>,
    pub debounce_ms: Option<u64>,
}

impl SettingsOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(wrap) = self.word_wrap {
            settings.word_wrap = wrap;
        }
        if let Some(numbers) = self.show_line_numbers {
            settings.show_line_numbers = numbers;
        }
        if let Some(enabled) = self.sync_enabled {
            settings.sync.enabled = enabled;
        }
        if let Some(smooth) = self.smooth_scroll {
            settings.sync.smooth_scroll = smooth;
        }
        if let Some(ratio) = self.sync_ratio {
            settings.sync.sync_ratio = ratio;
        }
        if let Some(debounce) = self.debounce_ms {
            settings.sync.debounce_ms = debounce.max(MIN_DEBOUNCE_MS);
        }
    }
}

/// Location of the settings file for this platform.
pub fn settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join(SETTINGS_FILE);
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join(SETTINGS_FILE);
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join(SETTINGS_FILE);
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join(APP_DIR)
                .join(SETTINGS_FILE);
        }
    }

    PathBuf::from(SETTINGS_FILE)
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings, falling back to defaults when the file cannot be used.
pub fn load_or_default(path: &Path) -> Settings {
    load_settings(path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load settings, using defaults");
        Settings::default()
    })
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, format!("{json}\n")).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove stored settings so the next load returns the defaults.
pub fn reset_settings(path: &Path) -> Result<(), SettingsError> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, ThemeMode::System);
        assert!(settings.word_wrap);
        assert!(settings.show_line_numbers);
        assert_eq!(settings.auto_save_interval, 5000);
        assert!(!settings.table_zebra_stripes);
        assert!(settings.sync.enabled);
        assert_eq!(settings.sync.debounce_ms, 16);
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let json = r#"{ "wordWrap": false, "sync": { "syncRatio": 0.5 } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert!(!settings.word_wrap);
        assert_eq!(settings.sync.sync_ratio, 0.5);
        assert!(settings.sync.enabled);
        assert_eq!(settings.font_size, 14);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"showLineNumbers\":true"));
        assert!(json.contains("\"theme\":\"system\""));
        assert!(json.contains("\"smoothScroll\":true"));
    }

    #[test]
    fn test_save_load_and_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = Settings {
            theme: ThemeMode::Dark,
            word_wrap: false,
            ..Settings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);

        reset_settings(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_settings(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings(&path), Err(SettingsError::Parse { .. })));
        assert_eq!(load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_overrides_apply_over_file() {
        let mut settings = Settings::default();
        let overrides = SettingsOverrides {
            word_wrap: Some(false),
            sync_enabled: Some(false),
            ..SettingsOverrides::default()
        };
        assert!(!overrides.is_empty());
        overrides.apply(&mut settings);
        assert!(!settings.word_wrap);
        assert!(!settings.sync.enabled);
        assert!(settings.show_line_numbers);
    }

    #[test]
    fn test_zero_debounce_is_raised_to_minimum() {
        let mut settings = Settings::default();
        SettingsOverrides {
            debounce_ms: Some(0),
            ..SettingsOverrides::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.sync.debounce_ms, MIN_DEBOUNCE_MS);

        let from_file = SyncSettings {
            debounce_ms: 0,
            ..SyncSettings::default()
        };
        let update = from_file.to_update();
        assert_eq!(update.debounce_ms, Some(MIN_DEBOUNCE_MS));
        assert_eq!(update.max_wait_ms, Some(Some(MIN_DEBOUNCE_MS * 4)));
    }

    #[test]
    fn test_theme_cycles_through_every_mode() {
        assert_eq!(ThemeMode::Light.next(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.next(), ThemeMode::System);
        assert_eq!(ThemeMode::System.next(), ThemeMode::Light);
    }

    #[test]
    fn test_sync_settings_update_scales_max_wait() {
        let sync = SyncSettings {
            debounce_ms: 20,
            sync_ratio: 3.0,
            ..SyncSettings::default()
        };
        let update = sync.to_update();
        assert_eq!(update.max_wait_ms, Some(Some(80)));
        assert_eq!(update.sync_ratio, Some(1.0));
    }
}
