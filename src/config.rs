//! User settings, stored as JSON under the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use home::home_dir;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "apk_share";
const SETTINGS_FILE: &str = "settings.json";

/// Where the Share button delivers the staged installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShareTarget {
    /// Reveal the file in Finder / Explorer / the desktop file manager
    #[default]
    FileManager,
    /// Push the file into the device's Download folder
    DeviceDownloads,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// adb executable, looked up on PATH unless absolute.
    pub adb_path: String,
    /// Device serial passed as `adb -s`; `None` lets adb pick the only device.
    pub device_serial: Option<String>,
    /// Minimum time the list stays in its loading state.
    pub min_loading_ms: u64,
    /// Override for the private cache directory.
    pub cache_dir: Option<PathBuf>,
    pub share_authority: String,
    pub chooser_title: String,
    pub share_target: ShareTarget,
    /// How long status messages stay visible.
    pub toast_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adb_path: "adb".to_string(),
            device_serial: None,
            min_loading_ms: crate::core::MIN_LOADING.as_millis() as u64,
            cache_dir: None,
            share_authority: format!("{}.fileprovider", APP_DIR),
            chooser_title: "Share".to_string(),
            share_target: ShareTarget::default(),
            toast_secs: 4,
        }
    }
}

impl Settings {
    /// Load from the default location. Missing or unreadable files yield defaults.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let mut settings = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|json| serde_json::from_str::<Settings>(&json).map_err(anyhow::Error::from))
        {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read settings, using defaults");
                Self::default()
            }
        };
        settings.validate();
        settings
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Create {:?}", dir))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Write {:?}", path))?;
        Ok(())
    }

    /// Clamp values to sane ranges.
    pub fn validate(&mut self) {
        if self.adb_path.trim().is_empty() {
            self.adb_path = "adb".to_string();
        }
        if self.device_serial.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.device_serial = None;
        }
        self.min_loading_ms = self
            .min_loading_ms
            .clamp(crate::core::MIN_LOADING.as_millis() as u64, 5_000);
        self.toast_secs = self.toast_secs.clamp(1, 60);
        if self.share_authority.trim().is_empty() {
            self.share_authority = Self::default().share_authority;
        }
        if self.chooser_title.trim().is_empty() {
            self.chooser_title = Self::default().chooser_title;
        }
    }

    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }

    /// Private cache area; the scratch and mirror directories live below it.
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        dirs::cache_dir()
            .or_else(|| home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.cache_dir().join("share")
    }

    pub fn mirror_dir(&self) -> PathBuf {
        self.cache_dir().join("mirror")
    }
}

/// `settings.json` in the platform config directory (Application Support, AppData, XDG).
pub fn settings_path() -> Option<PathBuf> {
    let base = dirs::config_dir().or_else(|| home_dir().map(|h| h.join(".config")))?;
    Some(base.join(APP_DIR).join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let s = Settings::load_from(&dir.path().join("settings.json"));
        assert_eq!(s, Settings::default());
        assert_eq!(s.min_loading(), Duration::from_millis(500));
    }

    #[test]
    fn partial_file_fills_in_defaults_and_clamps() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "device_serial": "emulator-5554", "min_loading_ms": 90000, "share_target": "DeviceDownloads" }"#,
        )
        .unwrap();

        let s = Settings::load_from(&path);
        assert_eq!(s.device_serial.as_deref(), Some("emulator-5554"));
        assert_eq!(s.min_loading_ms, 5_000);
        assert_eq!(s.share_target, ShareTarget::DeviceDownloads);
        assert_eq!(s.adb_path, "adb");
    }

    #[test]
    fn loading_floor_cannot_be_configured_away() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "min_loading_ms": 0 }"#).unwrap();

        let s = Settings::load_from(&path);
        assert_eq!(s.min_loading(), Duration::from_millis(500));
    }

    #[test]
    fn default_dirs_are_app_specific() {
        let s = Settings::default();
        assert!(s.cache_dir().ends_with(APP_DIR));
        assert!(s.cache_dir().is_absolute());
        assert_eq!(s.mirror_dir(), s.cache_dir().join("mirror"));
        if let Some(path) = settings_path() {
            assert!(path.is_absolute());
            assert!(path.ends_with(Path::new(APP_DIR).join(SETTINGS_FILE)));
        }
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            cache_dir: Some(dir.path().join("cache")),
            chooser_title: "Send APK".into(),
            ..Settings::default()
        };
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded, s);
        assert_eq!(loaded.scratch_dir(), dir.path().join("cache").join("share"));
        assert_eq!(loaded.mirror_dir(), dir.path().join("cache").join("mirror"));
    }
}
