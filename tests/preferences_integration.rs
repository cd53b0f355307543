use ratewatch::application::preferences::PreferencesService;
use ratewatch::domain::ports::PreferenceStore;
use ratewatch::domain::preferences::NotificationPreferences;
use ratewatch::infrastructure::JsonPreferenceStore;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn prefs(email: &str, at_9am: bool, at_6pm: bool) -> NotificationPreferences {
    NotificationPreferences {
        email: email.to_string(),
        notify_at_9am: at_9am,
        notify_at_6pm: at_6pm,
    }
}

#[test]
fn test_saved_preferences_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("notification_settings.json");

    let service = PreferencesService::new(Arc::new(JsonPreferenceStore::with_path(&path)));
    service
        .save(&prefs("me@example.com", true, false))
        .unwrap();

    // A fresh store stands in for the next launch
    let reloaded = PreferencesService::new(Arc::new(JsonPreferenceStore::with_path(&path)));
    assert_eq!(
        reloaded.load_or_default(),
        prefs("me@example.com", true, false)
    );
}

#[test]
fn test_file_uses_wire_field_names() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let store = JsonPreferenceStore::with_path(&path);

    store.save(&prefs("a@b.co", false, true)).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["email"], "a@b.co");
    assert_eq!(raw["notify9am"], false);
    assert_eq!(raw["notify6pm"], true);
}

#[test]
fn test_invalid_email_is_not_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let service = PreferencesService::new(Arc::new(JsonPreferenceStore::with_path(&path)));

    assert!(service.save(&prefs("not-an-email", true, true)).is_err());
    assert!(!path.exists());
    assert_eq!(service.load_or_default(), NotificationPreferences::default());
}

#[test]
fn test_unreadable_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonPreferenceStore::with_path(&path);
    assert!(store.load().is_err());

    let service = PreferencesService::new(Arc::new(store));
    assert_eq!(service.load_or_default(), NotificationPreferences::default());
}

#[test]
fn test_partial_file_fills_missing_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{"notify6pm": true}"#).unwrap();

    let loaded = JsonPreferenceStore::with_path(&path).load().unwrap().unwrap();
    assert_eq!(loaded, prefs("", false, true));
}
