use uuid::Uuid;

use crate::models::{event::NotificationKind, status::Channel};

/// Why a dispatch stopped. The notification record may already exist when
/// any of the post-persistence variants is returned.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Push client initialization failed: {0}")]
    PushInit(String),

    #[error("Failed to persist notification: {0}")]
    Persistence(String),

    #[error("Recipient has no notification settings for {kind}")]
    MissingPreference { kind: NotificationKind },

    #[error("Recipient has no {field} for {channel} notifications")]
    MissingContact {
        channel: Channel,
        field: &'static str,
    },

    #[error("{channel} delivery failed: {message}")]
    Transport { channel: Channel, message: String },

    #[error("Failed to mirror notification into chat: {0}")]
    ChatMirror(String),

    #[error("Failed to render email: {0}")]
    Render(String),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("User lookup failed: {0}")]
    UserLookup(String),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
