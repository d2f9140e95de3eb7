use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::{
    clients::{ChatStore, NotificationStore, UserDirectory},
    models::{
        chat::{ChatMessage, ChatMessageKind, ChatRoom, NewChatMessage},
        event::NotificationKind,
        notification::{CreateNotification, DeliveryReport, Notification},
        status::{Channel, ChannelStatus},
        user::{NotificationSettings, UserProfile},
    },
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL,
    avatar_url TEXT,
    email TEXT,
    phone_number TEXT,
    fcm_registration_token TEXT,
    notification_settings JSONB NOT NULL DEFAULT '{}'::jsonb
);

CREATE TABLE IF NOT EXISTS notifications (
    id UUID PRIMARY KEY,
    sender_id UUID NOT NULL,
    recipient_id UUID NOT NULL,
    type TEXT NOT NULL,
    data JSONB NOT NULL,
    created_by UUID NOT NULL,
    updated_by UUID NOT NULL,
    browser_status TEXT NOT NULL DEFAULT 'not_attempted',
    text_status TEXT NOT NULL DEFAULT 'not_attempted',
    email_status TEXT NOT NULL DEFAULT 'not_attempted',
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications (recipient_id);

CREATE TABLE IF NOT EXISTS chat_rooms (
    id UUID PRIMARY KEY,
    sender_id UUID NOT NULL,
    recipient_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS chat_rooms_pair_idx
    ON chat_rooms (LEAST(sender_id, recipient_id), GREATEST(sender_id, recipient_id));

CREATE TABLE IF NOT EXISTS chat_messages (
    id UUID PRIMARY KEY,
    room_id UUID NOT NULL REFERENCES chat_rooms (id),
    sender_id UUID NOT NULL,
    kind TEXT NOT NULL,
    text TEXT,
    notification_data JSONB,
    created_at TIMESTAMPTZ NOT NULL
);
"#;

pub struct DatabaseClient {
    client: Client,
}

impl DatabaseClient {
    pub async fn connect(database_url: &str) -> Result<Self, Error> {
        info!("Connecting to PostgreSQL database");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        info!("PostgreSQL connection established");

        Ok(Self { client })
    }

    pub async fn ensure_schema(&self) -> Result<(), Error> {
        self.client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| anyhow!("Failed to apply schema: {}", e))?;

        debug!("Database schema is up to date");
        Ok(())
    }

    pub async fn upsert_user(&self, user: &UserProfile) -> Result<(), Error> {
        let settings = serde_json::to_value(&user.notification_settings)?;

        self.client
            .execute(
                r#"
                INSERT INTO users (
                    id, username, avatar_url, email, phone_number,
                    fcm_registration_token, notification_settings
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    username = EXCLUDED.username,
                    avatar_url = EXCLUDED.avatar_url,
                    email = EXCLUDED.email,
                    phone_number = EXCLUDED.phone_number,
                    fcm_registration_token = EXCLUDED.fcm_registration_token,
                    notification_settings = EXCLUDED.notification_settings
                "#,
                &[
                    &user.id,
                    &user.username,
                    &user.avatar_url,
                    &user.email,
                    &user.phone_number,
                    &user.fcm_registration_token,
                    &settings,
                ],
            )
            .await
            .map_err(|e| anyhow!("Failed to upsert user {}: {}", user.id, e))?;

        Ok(())
    }
}

fn notification_from_row(row: &Row) -> Result<Notification, Error> {
    let kind: String = row.try_get("type")?;

    Ok(Notification {
        id: row.try_get("id")?,
        sender: row.try_get("sender_id")?,
        recipient: row.try_get("recipient_id")?,
        kind: kind.parse::<NotificationKind>()?,
        data: row.try_get("data")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        deliveries: DeliveryReport {
            browser: ChannelStatus::from_string(row.try_get("browser_status")?),
            text: ChannelStatus::from_string(row.try_get("text_status")?),
            email: ChannelStatus::from_string(row.try_get("email_status")?),
        },
        created_at: row.try_get("created_at")?,
    })
}

fn room_from_row(row: &Row) -> Result<ChatRoom, Error> {
    Ok(ChatRoom {
        id: row.try_get("id")?,
        sender: row.try_get("sender_id")?,
        recipient: row.try_get("recipient_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn message_from_row(row: &Row) -> Result<ChatMessage, Error> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        room_id: row.try_get("room_id")?,
        sender: row.try_get("sender_id")?,
        kind: ChatMessageKind::from_string(row.try_get("kind")?),
        text: row.try_get("text")?,
        notification_data: row.try_get("notification_data")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &Row) -> Result<UserProfile, Error> {
    let settings: serde_json::Value = row.try_get("notification_settings")?;

    Ok(UserProfile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        avatar_url: row.try_get("avatar_url")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        fcm_registration_token: row.try_get("fcm_registration_token")?,
        notification_settings: serde_json::from_value::<NotificationSettings>(settings)?,
    })
}

#[async_trait]
impl NotificationStore for DatabaseClient {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, notification: CreateNotification) -> Result<Notification, Error> {
        let notification = notification.into_notification();
        let kind = notification.kind.as_str();

        self.client
            .execute(
                r#"
                INSERT INTO notifications (
                    id, sender_id, recipient_id, type, data,
                    created_by, updated_by, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
                &[
                    &notification.id,
                    &notification.sender,
                    &notification.recipient,
                    &kind,
                    &notification.data,
                    &notification.created_by,
                    &notification.updated_by,
                    &notification.created_at,
                ],
            )
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    notification_id = %notification.id,
                    "Failed to write notification to database"
                );
                anyhow!("Database write failed: {}", e)
            })?;

        debug!(notification_id = %notification.id, "Notification written to database");

        Ok(notification)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Notification>, Error> {
        let row = self
            .client
            .query_opt("SELECT * FROM notifications WHERE id = $1", &[&id])
            .await
            .map_err(|e| anyhow!("Notification lookup failed: {}", e))?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn update_delivery(
        &self,
        id: Uuid,
        channel: Channel,
        status: ChannelStatus,
    ) -> Result<(), Error> {
        let column = match channel {
            Channel::Browser => "browser_status",
            Channel::Text => "text_status",
            Channel::Email => "email_status",
        };
        let query = format!("UPDATE notifications SET {} = $1 WHERE id = $2", column);
        let status_str = status.as_str();

        let updated = self
            .client
            .execute(query.as_str(), &[&status_str, &id])
            .await
            .map_err(|e| anyhow!("Delivery status update failed: {}", e))?;

        if updated == 0 {
            return Err(anyhow!("Notification {} not found", id));
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| anyhow!("Database health check failed: {}", e))?;

        Ok(())
    }
}

#[async_trait]
impl ChatStore for DatabaseClient {
    async fn find_direct_room(&self, a: Uuid, b: Uuid) -> Result<Option<ChatRoom>, Error> {
        let row = self
            .client
            .query_opt(
                r#"
                SELECT * FROM chat_rooms
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
                ORDER BY created_at
                LIMIT 1
                "#,
                &[&a, &b],
            )
            .await
            .map_err(|e| anyhow!("Chat room lookup failed: {}", e))?;

        row.as_ref().map(room_from_row).transpose()
    }

    // A concurrent mirror may have opened the room first; that room wins.
    async fn create_direct_room(&self, sender: Uuid, recipient: Uuid) -> Result<ChatRoom, Error> {
        let room = ChatRoom::direct(sender, recipient);

        let inserted = self
            .client
            .execute(
                r#"
                INSERT INTO chat_rooms (id, sender_id, recipient_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT DO NOTHING
                "#,
                &[
                    &room.id,
                    &room.sender,
                    &room.recipient,
                    &room.created_at,
                    &room.updated_at,
                ],
            )
            .await
            .map_err(|e| anyhow!("Chat room creation failed: {}", e))?;

        if inserted == 0 {
            debug!(sender = %sender, recipient = %recipient, "Chat room already exists");
            return self
                .find_direct_room(sender, recipient)
                .await?
                .ok_or_else(|| anyhow!("Chat room between {} and {} vanished", sender, recipient));
        }

        Ok(room)
    }

    async fn append_message(
        &self,
        room_id: Uuid,
        message: NewChatMessage,
    ) -> Result<ChatMessage, Error> {
        let message = message.into_message(room_id);
        let kind = message.kind.as_str();

        self.client
            .execute(
                r#"
                INSERT INTO chat_messages (
                    id, room_id, sender_id, kind, text, notification_data, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
                &[
                    &message.id,
                    &message.room_id,
                    &message.sender,
                    &kind,
                    &message.text,
                    &message.notification_data,
                    &message.created_at,
                ],
            )
            .await
            .map_err(|e| anyhow!("Chat message insert failed: {}", e))?;

        Ok(message)
    }

    async fn touch_room(&self, room_id: Uuid) -> Result<(), Error> {
        self.client
            .execute(
                "UPDATE chat_rooms SET updated_at = now() WHERE id = $1",
                &[&room_id],
            )
            .await
            .map_err(|e| anyhow!("Chat room update failed: {}", e))?;

        Ok(())
    }

    async fn messages(&self, room_id: Uuid) -> Result<Vec<ChatMessage>, Error> {
        let rows = self
            .client
            .query(
                "SELECT * FROM chat_messages WHERE room_id = $1 ORDER BY created_at",
                &[&room_id],
            )
            .await
            .map_err(|e| anyhow!("Chat message lookup failed: {}", e))?;

        rows.iter().map(message_from_row).collect()
    }
}

#[async_trait]
impl UserDirectory for DatabaseClient {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, Error> {
        let row = self
            .client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await
            .map_err(|e| anyhow!("User lookup failed: {}", e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}
