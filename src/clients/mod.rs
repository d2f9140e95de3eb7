use std::sync::Arc;

use anyhow::{Error, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    chat::{ChatMessage, ChatRoom, NewChatMessage},
    fcm::PushMessage,
    notification::{CreateNotification, Notification},
    status::{Channel, ChannelStatus},
    template::EmailContent,
    user::UserProfile,
};

pub mod database;
pub mod fcm;
pub mod health;
pub mod mailer;
pub mod memory;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Short backend name reported by the health check.
    fn backend(&self) -> &'static str;

    async fn create(&self, notification: CreateNotification) -> Result<Notification, Error>;

    async fn find(&self, id: Uuid) -> Result<Option<Notification>, Error>;

    async fn update_delivery(
        &self,
        id: Uuid,
        channel: Channel,
        status: ChannelStatus,
    ) -> Result<(), Error>;

    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Direct-message rooms and their message streams.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Room between the two users, whichever of them opened it.
    async fn find_direct_room(&self, a: Uuid, b: Uuid) -> Result<Option<ChatRoom>, Error>;

    async fn create_direct_room(&self, sender: Uuid, recipient: Uuid) -> Result<ChatRoom, Error>;

    async fn append_message(
        &self,
        room_id: Uuid,
        message: NewChatMessage,
    ) -> Result<ChatMessage, Error>;

    /// Bumps `updated_at` so the room sorts to the top of the inbox.
    async fn touch_room(&self, room_id: Uuid) -> Result<(), Error>;

    async fn messages(&self, room_id: Uuid) -> Result<Vec<ChatMessage>, Error>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, Error>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), Error>;
}

/// Builds the process-wide push client. Runs the credential setup, so it
/// must only be called once per process.
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn PushSender>, Error>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, content: &EmailContent) -> Result<(), Error>;
}
