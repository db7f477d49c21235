use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::api::DEFAULT_API_URL;
use crate::watcher::loop_worker::{PollTiming, FETCH_TIMEOUT_SECS, POLL_INTERVAL_SECS};

pub const API_URL_ENV: &str = "BELIEVE_API_URL";
pub const DATA_DIR_ENV: &str = "BELIEVE_DATA_DIR";
pub const DEBUG_ENV: &str = "BELIEVE_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchSettings {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.into(),
            poll_interval_secs: POLL_INTERVAL_SECS,
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
        }
    }
}

impl WatchSettings {
    /// Zero values would spin the poller; they are raised to one second.
    pub fn poll_timing(&self) -> PollTiming {
        PollTiming {
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs.max(1)),
        }
    }

    /// `BELIEVE_API_URL` wins over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct UserSettings {
    watch: WatchSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn watch(&self) -> WatchSettings {
        self.read_guard().watch.clone()
    }

    pub fn update_watch(&self, settings: WatchSettings) -> Result<()> {
        let mut guard = self.write_guard();
        guard.watch = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        *self.write_guard() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// `BELIEVE_DATA_DIR` if set, otherwise the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    ProjectDirs::from("fr", "Believe", "believe-notify")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| anyhow!("no home directory to place application data in"))
}

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.watch(), WatchSettings::default());

        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.watch().poll_interval_secs, 30);
    }

    #[test]
    fn updates_persist_and_partial_files_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update_watch(WatchSettings {
                api_base_url: "https://api.believe.example/api".into(),
                poll_interval_secs: 60,
                ..WatchSettings::default()
            })
            .unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.watch().poll_interval_secs, 60);
        assert_eq!(reopened.watch().fetch_timeout_secs, 10);

        fs::write(&path, r#"{"watch":{"poll_interval_secs":5}}"#).unwrap();
        reopened.reload().unwrap();
        assert_eq!(reopened.watch().api_base_url, DEFAULT_API_URL);
        assert_eq!(reopened.watch().poll_interval_secs, 5);
    }

    #[test]
    fn zero_durations_are_clamped() {
        let timing = WatchSettings {
            poll_interval_secs: 0,
            fetch_timeout_secs: 0,
            ..WatchSettings::default()
        }
        .poll_timing();
        assert_eq!(timing.interval, Duration::from_secs(1));
        assert_eq!(timing.fetch_timeout, Duration::from_secs(1));
    }
}
