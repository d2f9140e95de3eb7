use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::{
    event::NotificationKind,
    status::{Channel, ChannelStatus},
};

/// Outcome of each delivery channel for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub browser: ChannelStatus,
    pub text: ChannelStatus,
    pub email: ChannelStatus,
}

impl DeliveryReport {
    pub fn set(&mut self, channel: Channel, status: ChannelStatus) {
        match channel {
            Channel::Browser => self.browser = status,
            Channel::Text => self.text = status,
            Channel::Email => self.email = status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub sender: Uuid,
    pub recipient: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub data: JsonValue,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deliveries: DeliveryReport,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNotification {
    pub sender: Uuid,
    pub recipient: Uuid,
    pub kind: NotificationKind,
    pub data: JsonValue,
}

impl CreateNotification {
    pub fn new(sender: Uuid, recipient: Uuid, kind: NotificationKind) -> Self {
        Self {
            sender,
            recipient,
            kind,
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }

    /// Materializes the record the way every store persists it: fresh id,
    /// audit fields pointing at the sender, nothing delivered yet.
    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            sender: self.sender,
            recipient: self.recipient,
            kind: self.kind,
            data: self.data,
            created_by: self.sender,
            updated_by: self.sender,
            deliveries: DeliveryReport::default(),
            created_at: Utc::now(),
        }
    }
}
