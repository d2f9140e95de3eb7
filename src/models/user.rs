use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::event::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelPreferences {
    pub browser: bool,
    pub text: bool,
    pub email: bool,
}

impl ChannelPreferences {
    pub fn new(browser: bool, text: bool, email: bool) -> Self {
        Self {
            browser,
            text,
            email,
        }
    }
}

/// Per-kind channel switches from the recipient's profile.
///
/// Entries whose key is not a known kind, or whose value is not a set of
/// switches, are dropped when reading a profile. A lookup for such a kind
/// then reports a missing preference instead of failing the whole profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct NotificationSettings(HashMap<NotificationKind, ChannelPreferences>);

impl<'de> Deserialize<'de> for NotificationSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, JsonValue>::deserialize(deserializer)?;

        let settings = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let kind = key.parse::<NotificationKind>().ok()?;
                let preferences = serde_json::from_value::<ChannelPreferences>(value).ok()?;
                Some((kind, preferences))
            })
            .collect();

        Ok(Self(settings))
    }
}

impl NotificationSettings {
    /// Same preferences for every kind.
    pub fn uniform(preferences: ChannelPreferences) -> Self {
        Self(
            NotificationKind::ALL
                .into_iter()
                .map(|kind| (kind, preferences))
                .collect(),
        )
    }

    pub fn get(&self, kind: NotificationKind) -> Option<ChannelPreferences> {
        self.0.get(&kind).copied()
    }

    pub fn set(&mut self, kind: NotificationKind, preferences: ChannelPreferences) {
        self.0.insert(kind, preferences);
    }

    pub fn remove(&mut self, kind: NotificationKind) {
        self.0.remove(&kind);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub fcm_registration_token: Option<String>,
    #[serde(default)]
    pub notification_settings: NotificationSettings,
}
