use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: Uuid,
    pub sender: Uuid,
    pub recipient: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRoom {
    pub fn direct(sender: Uuid, recipient: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender,
            recipient,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender == a && self.recipient == b) || (self.sender == b && self.recipient == a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageKind {
    Text,
    Notification,
}

impl ChatMessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMessageKind::Text => "text",
            ChatMessageKind::Notification => "notification",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "notification" => ChatMessageKind::Notification,
            _ => ChatMessageKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender: Uuid,
    pub kind: ChatMessageKind,
    pub text: Option<String>,
    pub notification_data: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub sender: Uuid,
    pub kind: ChatMessageKind,
    pub text: Option<String>,
    pub notification_data: Option<JsonValue>,
}

impl NewChatMessage {
    /// Synthetic, non-text message mirroring a notification into a room.
    pub fn notification(sender: Uuid, notification_data: JsonValue) -> Self {
        Self {
            sender,
            kind: ChatMessageKind::Notification,
            text: None,
            notification_data: Some(notification_data),
        }
    }

    pub fn into_message(self, room_id: Uuid) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            room_id,
            sender: self.sender,
            kind: self.kind,
            text: self.text,
            notification_data: self.notification_data,
            created_at: Utc::now(),
        }
    }
}
