#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use charsi_notifier::{
    clients::{ChatStore, EmailSender, PushConnector, PushSender, memory::InMemoryStore},
    dispatcher::{Collaborators, Dispatcher},
    models::{
        chat::{ChatMessage, ChatRoom, NewChatMessage},
        event::{BidRef, ListingRewardRef, NotificationEvent, TradeRef},
        fcm::PushMessage,
        template::EmailContent,
        user::{ChannelPreferences, NotificationSettings, UserProfile},
    },
};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const FRONTEND_URL: &str = "https://charsi.test";
pub const PUSH_TOKEN: &str = "fcm-registration-token-0123456789";

#[derive(Default)]
pub struct RecordingPush {
    pub sent: Mutex<Vec<PushMessage>>,
    pub fail: bool,
}

impl RecordingPush {
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, message: &PushMessage) -> Result<(), Error> {
        if self.fail {
            return Err(anyhow!("FCM request failed with status 503"));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

pub struct CountingConnector {
    pub connects: AtomicU32,
    pub push: Arc<RecordingPush>,
    pub fail: bool,
}

#[async_trait]
impl PushConnector for CountingConnector {
    async fn connect(&self) -> Result<Arc<dyn PushSender>, Error> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail {
            return Err(anyhow!("credentials file not found"));
        }
        Ok(self.push.clone())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, EmailContent)>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, content: &EmailContent) -> Result<(), Error> {
        if self.fail {
            return Err(anyhow!("SMTP send failed: connection refused"));
        }
        self.sent.lock().await.push((to.to_string(), content.clone()));
        Ok(())
    }
}

/// Chat store whose backend is down.
pub struct UnavailableChatStore;

#[async_trait]
impl ChatStore for UnavailableChatStore {
    async fn find_direct_room(&self, _a: Uuid, _b: Uuid) -> Result<Option<ChatRoom>, Error> {
        Err(anyhow!("chat store unavailable"))
    }

    async fn create_direct_room(&self, _sender: Uuid, _recipient: Uuid) -> Result<ChatRoom, Error> {
        Err(anyhow!("chat store unavailable"))
    }

    async fn append_message(
        &self,
        _room_id: Uuid,
        _message: NewChatMessage,
    ) -> Result<ChatMessage, Error> {
        Err(anyhow!("chat store unavailable"))
    }

    async fn touch_room(&self, _room_id: Uuid) -> Result<(), Error> {
        Err(anyhow!("chat store unavailable"))
    }

    async fn messages(&self, _room_id: Uuid) -> Result<Vec<ChatMessage>, Error> {
        Err(anyhow!("chat store unavailable"))
    }
}

#[derive(Default)]
pub struct HarnessOptions {
    pub push_fails: bool,
    pub connect_fails: bool,
    pub mail_fails: bool,
    pub chat_unavailable: bool,
}

pub struct Harness {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<InMemoryStore>,
    pub push: Arc<RecordingPush>,
    pub connector: Arc<CountingConnector>,
    pub mailer: Arc<RecordingMailer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(HarnessOptions::default())
    }

    pub fn with_options(options: HarnessOptions) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let push = Arc::new(RecordingPush {
            fail: options.push_fails,
            ..Default::default()
        });
        let connector = Arc::new(CountingConnector {
            connects: AtomicU32::new(0),
            push: push.clone(),
            fail: options.connect_fails,
        });
        let mailer = Arc::new(RecordingMailer {
            fail: options.mail_fails,
            ..Default::default()
        });

        let chats: Arc<dyn ChatStore> = if options.chat_unavailable {
            Arc::new(UnavailableChatStore)
        } else {
            store.clone()
        };

        let dispatcher = Arc::new(Dispatcher::new(
            Collaborators {
                notifications: store.clone(),
                chats,
                users: store.clone(),
                mailer: mailer.clone(),
                push_connector: connector.clone(),
            },
            FRONTEND_URL,
        ));

        Self {
            dispatcher,
            store,
            push,
            connector,
            mailer,
        }
    }

    pub fn connects(&self) -> u32 {
        self.connector.connects.load(Ordering::SeqCst)
    }
}

pub fn user(username: &str, preferences: ChannelPreferences) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        username: username.to_string(),
        avatar_url: Some(format!("https://cdn.charsi.test/avatars/{}.png", username)),
        email: Some(format!("{}@example.com", username)),
        phone_number: Some("+15555550100".to_string()),
        fcm_registration_token: Some(PUSH_TOKEN.to_string()),
        notification_settings: NotificationSettings::uniform(preferences),
    }
}

pub fn listing_reward(title: &str) -> ListingRewardRef {
    ListingRewardRef {
        id: Uuid::new_v4(),
        title: title.to_string(),
    }
}

pub fn bid(title: &str) -> BidRef {
    BidRef {
        id: Uuid::new_v4(),
        listing_reward: listing_reward(title),
    }
}

pub fn bid_event(title: &str) -> NotificationEvent {
    NotificationEvent::BidOnMyListing { bid: bid(title) }
}

pub fn trade_event(title: &str) -> NotificationEvent {
    NotificationEvent::PurchasedMyListing {
        trade: TradeRef {
            id: Uuid::new_v4(),
            listing_reward: listing_reward(title),
        },
    }
}
