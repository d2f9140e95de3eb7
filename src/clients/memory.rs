use std::collections::HashMap;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    clients::{ChatStore, NotificationStore, UserDirectory},
    models::{
        chat::{ChatMessage, ChatRoom, NewChatMessage},
        notification::{CreateNotification, Notification},
        status::{Channel, ChannelStatus},
        user::UserProfile,
    },
};

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, UserProfile>>,
    notifications: RwLock<Vec<Notification>>,
    rooms: RwLock<Vec<ChatRoom>>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserProfile) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn notifications_for(&self, recipient: Uuid) -> Vec<Notification> {
        self.notifications
            .read()
            .await
            .iter()
            .filter(|notification| notification.recipient == recipient)
            .cloned()
            .collect()
    }

    pub async fn rooms(&self) -> Vec<ChatRoom> {
        self.rooms.read().await.clone()
    }

    /// Inserts a room as-is, keeping the given orientation.
    pub async fn insert_room(&self, room: ChatRoom) {
        self.rooms.write().await.push(room);
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, notification: CreateNotification) -> Result<Notification, Error> {
        let notification = notification.into_notification();
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Notification>, Error> {
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .find(|notification| notification.id == id)
            .cloned())
    }

    async fn update_delivery(
        &self,
        id: Uuid,
        channel: Channel,
        status: ChannelStatus,
    ) -> Result<(), Error> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .iter_mut()
            .find(|notification| notification.id == id)
            .ok_or_else(|| anyhow!("Notification {} not found", id))?;

        notification.deliveries.set(channel, status);
        Ok(())
    }
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn find_direct_room(&self, a: Uuid, b: Uuid) -> Result<Option<ChatRoom>, Error> {
        Ok(self
            .rooms
            .read()
            .await
            .iter()
            .find(|room| room.is_between(a, b))
            .cloned())
    }

    async fn create_direct_room(&self, sender: Uuid, recipient: Uuid) -> Result<ChatRoom, Error> {
        let room = ChatRoom::direct(sender, recipient);
        self.rooms.write().await.push(room.clone());
        Ok(room)
    }

    async fn append_message(
        &self,
        room_id: Uuid,
        message: NewChatMessage,
    ) -> Result<ChatMessage, Error> {
        if !self.rooms.read().await.iter().any(|room| room.id == room_id) {
            return Err(anyhow!("Chat room {} not found", room_id));
        }

        let message = message.into_message(room_id);
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn touch_room(&self, room_id: Uuid) -> Result<(), Error> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .iter_mut()
            .find(|room| room.id == room_id)
            .ok_or_else(|| anyhow!("Chat room {} not found", room_id))?;

        room.updated_at = Utc::now();
        Ok(())
    }

    async fn messages(&self, room_id: Uuid) -> Result<Vec<ChatMessage>, Error> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|message| message.room_id == room_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, Error> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}
