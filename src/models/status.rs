use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Browser,
    Text,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    #[default]
    NotAttempted,
    Sent,
    Failed,
    NotImplemented,
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelStatus::NotAttempted => "not_attempted",
            ChannelStatus::Sent => "sent",
            ChannelStatus::Failed => "failed",
            ChannelStatus::NotImplemented => "not_implemented",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => ChannelStatus::Sent,
            "failed" => ChannelStatus::Failed,
            "not_implemented" => ChannelStatus::NotImplemented,
            _ => ChannelStatus::NotAttempted,
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Channel::Browser => write!(f, "browser"),
            Channel::Text => write!(f, "text"),
            Channel::Email => write!(f, "email"),
        }
    }
}

impl Display for ChannelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}
