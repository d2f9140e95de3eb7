use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::NotificationEvent;

/// Body of `POST /api/notifications/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatNotificationRequest {
    #[serde(rename = "recipientID")]
    pub recipient_id: Uuid,
    #[serde(rename = "chatRoomID")]
    pub chat_room_id: Uuid,
}

/// Body of `POST /api/notifications`, sent by the marketplace controllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "senderID")]
    pub sender_id: Uuid,
    #[serde(rename = "recipientID")]
    pub recipient_id: Uuid,
    pub notification: NotificationEvent,
}
