use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Settings;

const SETTINGS_NAMESPACE: &str = "bakery_settings";

/// Key of the settings entry owned by one user.
pub fn settings_key(user_id: Uuid) -> String {
    format!("{SETTINGS_NAMESPACE}:{user_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SettingName {
    EmailNotifications,
    SmsNotifications,
    MarketingCommunications,
}

impl Settings {
    pub fn get(&self, name: SettingName) -> bool {
        match name {
            SettingName::EmailNotifications => self.email_notifications,
            SettingName::SmsNotifications => self.sms_notifications,
            SettingName::MarketingCommunications => self.marketing_communications,
        }
    }

    pub fn set(&mut self, name: SettingName, enabled: bool) {
        let slot = match name {
            SettingName::EmailNotifications => &mut self.email_notifications,
            SettingName::SmsNotifications => &mut self.sms_notifications,
            SettingName::MarketingCommunications => &mut self.marketing_communications,
        };
        *slot = enabled;
    }

    /// Decode a stored entry. Missing or malformed entries fall back to defaults.
    pub fn from_stored(value: Option<Value>) -> Self {
        match value {
            None => Self::default(),
            Some(raw) => serde_json::from_value(raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "discarding malformed settings entry");
                Self::default()
            }),
        }
    }

    pub fn to_stored(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_per_user() {
        let id = Uuid::nil();
        assert_eq!(
            settings_key(id),
            "bakery_settings:00000000-0000-0000-0000-000000000000"
        );
        assert_ne!(settings_key(Uuid::new_v4()), settings_key(Uuid::new_v4()));
    }

    #[test]
    fn defaults_when_nothing_is_stored() {
        let settings = Settings::from_stored(None);
        assert!(settings.email_notifications);
        assert!(settings.sms_notifications);
        assert!(!settings.marketing_communications);
    }

    #[test]
    fn malformed_entry_falls_back_to_defaults() {
        let settings = Settings::from_stored(Some(serde_json::json!("not an object")));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_entry_fills_missing_fields() {
        let settings =
            Settings::from_stored(Some(serde_json::json!({ "marketing_communications": true })));
        assert!(settings.marketing_communications);
        assert!(settings.email_notifications);
    }

    #[test]
    fn stored_entry_carries_every_field() {
        let stored = Settings::default().to_stored().unwrap();
        let object = stored.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["email_notifications"], true);
        assert_eq!(object["marketing_communications"], false);
    }

    #[test]
    fn toggle_keeps_memory_and_stored_value_in_step() {
        let mut settings = Settings::default();
        for name in [
            SettingName::EmailNotifications,
            SettingName::SmsNotifications,
            SettingName::MarketingCommunications,
        ] {
            let flipped = !settings.get(name);
            settings.set(name, flipped);

            let stored = settings.to_stored().unwrap();
            let reread = Settings::from_stored(Some(stored));
            assert_eq!(settings.get(name), flipped);
            assert_eq!(reread.get(name), flipped);
            assert_eq!(reread, settings);
        }
    }
}
