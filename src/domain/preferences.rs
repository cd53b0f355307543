use crate::domain::errors::PreferenceError;
use serde::{Deserialize, Serialize};

/// Notification preferences as stored on disk.
///
/// Recorded only; no notification is ever sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: String,
    #[serde(rename = "notify9am")]
    pub notify_at_9am: bool,
    #[serde(rename = "notify6pm")]
    pub notify_at_6pm: bool,
}

impl NotificationPreferences {
    /// An empty email is allowed (notifications simply have no recipient).
    pub fn validate(&self) -> Result<(), PreferenceError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Ok(());
        }

        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        };

        if valid {
            Ok(())
        } else {
            Err(PreferenceError::InvalidEmail {
                email: self.email.clone(),
            })
        }
    }

    pub fn has_schedule(&self) -> bool {
        self.notify_at_9am || self.notify_at_6pm
    }
}
