use crate::domain::ports::PreferenceStore;
use crate::domain::preferences::NotificationPreferences;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Reads preferences once at startup and writes them on explicit save.
pub struct PreferencesService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Falls back to defaults when nothing is stored or the stored copy is unreadable.
    pub fn load_or_default(&self) -> NotificationPreferences {
        match self.store.load() {
            Ok(Some(preferences)) => preferences,
            Ok(None) => NotificationPreferences::default(),
            Err(e) => {
                warn!("PreferencesService: ignoring unreadable preferences: {:#}", e);
                NotificationPreferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &NotificationPreferences) -> Result<()> {
        preferences
            .validate()
            .context("Refusing to save notification preferences")?;
        self.store.save(preferences)?;
        info!(
            "PreferencesService: saved (9am: {}, 6pm: {}). Delivery is not implemented.",
            preferences.notify_at_9am, preferences.notify_at_6pm
        );
        Ok(())
    }
}
