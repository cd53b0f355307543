use crate::domain::ports::PreferenceStore;
use crate::domain::preferences::NotificationPreferences;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

const SETTINGS_FILE: &str = "notification_settings.json";

/// Notification preferences stored as a JSON file.
pub struct JsonPreferenceStore {
    file_path: PathBuf,
}

impl JsonPreferenceStore {
    /// Uses `~/.ratewatch/notification_settings.json`.
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("Could not find HOME directory")?;
        Ok(Self::with_path(
            PathBuf::from(home).join(".ratewatch").join(SETTINGS_FILE),
        ))
    }

    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load(&self) -> Result<Option<NotificationPreferences>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.file_path).context("Failed to read preferences file")?;
        let preferences: NotificationPreferences =
            serde_json::from_str(&content).context("Failed to parse preferences JSON")?;

        info!("Loaded notification preferences from {:?}", self.file_path);
        Ok(Some(preferences))
    }

    fn save(&self, preferences: &NotificationPreferences) -> Result<()> {
        let parent = self
            .file_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            if !dir.exists() {
                fs::create_dir_all(dir).context("Failed to create preferences directory")?;
            }
        }

        let content = serde_json::to_string_pretty(preferences)
            .context("Failed to serialize preferences")?;

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp preferences file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename preferences file")?;

        info!("Saved notification preferences to {:?}", self.file_path);
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    preferences: RwLock<Option<NotificationPreferences>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load(&self) -> Result<Option<NotificationPreferences>> {
        let guard = self
            .preferences
            .read()
            .map_err(|_| anyhow::anyhow!("Preference store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, preferences: &NotificationPreferences) -> Result<()> {
        let mut guard = self
            .preferences
            .write()
            .map_err(|_| anyhow::anyhow!("Preference store lock poisoned"))?;
        *guard = Some(preferences.clone());
        Ok(())
    }
}
