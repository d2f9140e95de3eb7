use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    clients::{ChatStore, EmailSender, NotificationStore, PushConnector, PushSender, UserDirectory},
    error::{DispatchError, DispatchResult},
    models::{
        chat::NewChatMessage,
        event::{EventDescriptor, NotificationEvent, NotificationKind},
        fcm::PushMessage,
        notification::{CreateNotification, Notification},
        status::{Channel, ChannelStatus},
        user::UserProfile,
    },
    templates::{PUSH_TITLE, render_email},
};

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub sender: UserProfile,
    pub recipient: UserProfile,
    pub event: NotificationEvent,
}

pub struct Collaborators {
    pub notifications: Arc<dyn NotificationStore>,
    pub chats: Arc<dyn ChatStore>,
    pub users: Arc<dyn UserDirectory>,
    pub mailer: Arc<dyn EmailSender>,
    pub push_connector: Arc<dyn PushConnector>,
}

/// Persists a notification, then delivers it over the channels the
/// recipient enabled for its kind: browser push, text, email, in that order.
///
/// Channels run one after another and the first failure ends the dispatch.
/// The notification record is kept either way and carries the status of
/// every channel that was attempted.
pub struct Dispatcher {
    notifications: Arc<dyn NotificationStore>,
    chats: Arc<dyn ChatStore>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn EmailSender>,
    push_connector: Arc<dyn PushConnector>,
    push_client: OnceCell<Arc<dyn PushSender>>,
    push_init_failures: AtomicU32,
    frontend_url: String,
}

impl Dispatcher {
    pub fn new(collaborators: Collaborators, frontend_url: impl Into<String>) -> Self {
        let Collaborators {
            notifications,
            chats,
            users,
            mailer,
            push_connector,
        } = collaborators;

        Self {
            notifications,
            chats,
            users,
            mailer,
            push_connector,
            push_client: OnceCell::new(),
            push_init_failures: AtomicU32::new(0),
            frontend_url: frontend_url.into(),
        }
    }

    pub fn push_client_ready(&self) -> bool {
        self.push_client.initialized()
    }

    pub fn push_init_failures(&self) -> u32 {
        self.push_init_failures.load(Ordering::Relaxed)
    }

    /// Resolves both users and dispatches `event` from sender to recipient.
    pub async fn dispatch_between(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        event: NotificationEvent,
    ) -> DispatchResult<Notification> {
        let sender = self.resolve_user(sender_id).await?;
        let recipient = self.resolve_user(recipient_id).await?;

        self.dispatch(DispatchRequest {
            sender,
            recipient,
            event,
        })
        .await
    }

    /// Tells the recipient they have a new message in `chat_room_id`.
    pub async fn send_chat_notification(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        chat_room_id: Uuid,
    ) -> DispatchResult<Notification> {
        self.dispatch_between(
            sender_id,
            recipient_id,
            NotificationEvent::ChatMessages { chat_room_id },
        )
        .await
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResult<Notification> {
        let DispatchRequest {
            sender,
            recipient,
            event,
        } = request;
        let kind = event.kind();

        let push_client = self.push_client().await?;
        let descriptor = event.describe(&sender.username);

        let mut notification = self
            .notifications
            .create(
                CreateNotification::new(sender.id, recipient.id, kind)
                    .with_data(descriptor.data.clone()),
            )
            .await
            .map_err(|e| {
                error!(error = %e, kind = %kind, "Failed to create notification");
                DispatchError::Persistence(e.to_string())
            })?;

        info!(
            notification_id = %notification.id,
            kind = %kind,
            sender = %sender.id,
            recipient = %recipient.id,
            "Notification created"
        );

        let preferences = recipient.notification_settings.get(kind).ok_or_else(|| {
            warn!(
                notification_id = %notification.id,
                kind = %kind,
                recipient = %recipient.id,
                "Recipient has no settings for notification type"
            );
            DispatchError::MissingPreference { kind }
        })?;

        if preferences.browser {
            let outcome = self
                .deliver_push(push_client.as_ref(), &notification, &recipient, &descriptor)
                .await;
            self.record(&mut notification, Channel::Browser, &outcome).await;
            outcome?;

            if kind != NotificationKind::ChatMessages {
                self.mirror_into_chat(&sender, &recipient, kind, &descriptor)
                    .await?;
            }
        }

        if preferences.text {
            let outcome = Self::deliver_text(&recipient);
            self.record(&mut notification, Channel::Text, &outcome).await;
            outcome?;
        }

        if preferences.email {
            let outcome = self.deliver_email(&event, &sender, &recipient).await;
            self.record(&mut notification, Channel::Email, &outcome).await;
            outcome?;
        }

        info!(
            notification_id = %notification.id,
            browser = %notification.deliveries.browser,
            text = %notification.deliveries.text,
            email = %notification.deliveries.email,
            "Notification dispatched"
        );

        Ok(notification)
    }

    async fn push_client(&self) -> DispatchResult<&Arc<dyn PushSender>> {
        self.push_client
            .get_or_try_init(|| async {
                info!("Initializing push messaging client");
                self.push_connector.connect().await
            })
            .await
            .map_err(|e| {
                self.push_init_failures.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Push messaging client initialization failed");
                DispatchError::PushInit(e.to_string())
            })
    }

    async fn resolve_user(&self, id: Uuid) -> DispatchResult<UserProfile> {
        self.users
            .find_user(id)
            .await
            .map_err(|e| DispatchError::UserLookup(e.to_string()))?
            .ok_or(DispatchError::UserNotFound(id))
    }

    async fn deliver_push(
        &self,
        push_client: &dyn PushSender,
        notification: &Notification,
        recipient: &UserProfile,
        descriptor: &EventDescriptor,
    ) -> DispatchResult<ChannelStatus> {
        let token = recipient
            .fcm_registration_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(DispatchError::MissingContact {
                channel: Channel::Browser,
                field: "push registration token",
            })?;

        let data = HashMap::from([
            ("title".to_string(), PUSH_TITLE.to_string()),
            ("body".to_string(), descriptor.body.clone()),
            ("type".to_string(), notification.kind.to_string()),
            ("notificationID".to_string(), notification.id.to_string()),
        ]);

        let message = PushMessage {
            token: token.to_string(),
            title: PUSH_TITLE.to_string(),
            body: descriptor.body.clone(),
            data,
        };

        push_client.send(&message).await.map_err(|e| {
            error!(
                notification_id = %notification.id,
                error = %e,
                "Push delivery failed"
            );
            DispatchError::Transport {
                channel: Channel::Browser,
                message: e.to_string(),
            }
        })?;

        debug!(notification_id = %notification.id, "Push notification delivered");
        Ok(ChannelStatus::Sent)
    }

    // Text delivery has no provider yet. The channel still checks its
    // precondition so a missing phone number surfaces the same way as the
    // other channels.
    fn deliver_text(recipient: &UserProfile) -> DispatchResult<ChannelStatus> {
        recipient
            .phone_number
            .as_deref()
            .filter(|phone| !phone.is_empty())
            .ok_or(DispatchError::MissingContact {
                channel: Channel::Text,
                field: "phone number",
            })?;

        warn!(recipient = %recipient.id, "Text delivery is not implemented, skipping");
        Ok(ChannelStatus::NotImplemented)
    }

    async fn deliver_email(
        &self,
        event: &NotificationEvent,
        sender: &UserProfile,
        recipient: &UserProfile,
    ) -> DispatchResult<ChannelStatus> {
        let to = recipient
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or(DispatchError::MissingContact {
                channel: Channel::Email,
                field: "email address",
            })?;

        let content = render_email(event, sender, &self.frontend_url)
            .map_err(|e| DispatchError::Render(e.to_string()))?;

        self.mailer.send(to, &content).await.map_err(|e| {
            error!(recipient = %recipient.id, error = %e, "Email delivery failed");
            DispatchError::Transport {
                channel: Channel::Email,
                message: e.to_string(),
            }
        })?;

        debug!(recipient = %recipient.id, "Notification email delivered");
        Ok(ChannelStatus::Sent)
    }

    async fn mirror_into_chat(
        &self,
        sender: &UserProfile,
        recipient: &UserProfile,
        kind: NotificationKind,
        descriptor: &EventDescriptor,
    ) -> DispatchResult<()> {
        let mirror_error = |e: anyhow::Error| {
            error!(
                sender = %sender.id,
                recipient = %recipient.id,
                error = %e,
                "Failed to mirror notification into chat"
            );
            DispatchError::ChatMirror(e.to_string())
        };

        let room = match self
            .chats
            .find_direct_room(sender.id, recipient.id)
            .await
            .map_err(mirror_error)?
        {
            Some(room) => room,
            None => {
                debug!(sender = %sender.id, recipient = %recipient.id, "Creating direct chat room");
                self.chats
                    .create_direct_room(sender.id, recipient.id)
                    .await
                    .map_err(mirror_error)?
            }
        };

        let mut notification_data = descriptor.data.clone();
        if let Value::Object(fields) = &mut notification_data {
            fields.insert("type".to_string(), json!(kind.as_str()));
        }

        self.chats
            .append_message(room.id, NewChatMessage::notification(sender.id, notification_data))
            .await
            .map_err(mirror_error)?;
        self.chats.touch_room(room.id).await.map_err(mirror_error)?;

        debug!(room_id = %room.id, kind = %kind, "Notification mirrored into chat");
        Ok(())
    }

    async fn record(
        &self,
        notification: &mut Notification,
        channel: Channel,
        outcome: &DispatchResult<ChannelStatus>,
    ) {
        let status = match outcome {
            Ok(status) => *status,
            Err(_) => ChannelStatus::Failed,
        };
        notification.deliveries.set(channel, status);

        if let Err(e) = self
            .notifications
            .update_delivery(notification.id, channel, status)
            .await
        {
            warn!(
                notification_id = %notification.id,
                channel = %channel,
                error = %e,
                "Failed to record delivery status"
            );
        }
    }
}
