use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    ChatMessages,
    PurchasedMyListing,
    BidOnMyListing,
    MyOfferAccepted,
    MyOfferDeclined,
    MyRequestResponse,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        NotificationKind::ChatMessages,
        NotificationKind::PurchasedMyListing,
        NotificationKind::BidOnMyListing,
        NotificationKind::MyOfferAccepted,
        NotificationKind::MyOfferDeclined,
        NotificationKind::MyRequestResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ChatMessages => "ChatMessages",
            NotificationKind::PurchasedMyListing => "PurchasedMyListing",
            NotificationKind::BidOnMyListing => "BidOnMyListing",
            NotificationKind::MyOfferAccepted => "MyOfferAccepted",
            NotificationKind::MyOfferDeclined => "MyOfferDeclined",
            NotificationKind::MyRequestResponse => "MyRequestResponse",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown notification type '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRewardRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRef {
    pub id: Uuid,
    pub listing_reward: ListingRewardRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRef {
    pub id: Uuid,
    pub listing_reward: ListingRewardRef,
}

/// A marketplace event worth telling the recipient about, carrying exactly
/// the references its kind needs.
///
/// There is no catch-all variant: a payload with an unknown `type` fails to
/// deserialize, so requests carrying one are rejected before anything is
/// stored or sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    ChatMessages {
        #[serde(rename = "chatRoomID")]
        chat_room_id: Uuid,
    },
    PurchasedMyListing {
        trade: TradeRef,
    },
    BidOnMyListing {
        bid: BidRef,
    },
    MyOfferAccepted {
        bid: BidRef,
        #[serde(rename = "tradeID")]
        trade_id: Uuid,
    },
    MyOfferDeclined {
        bid: BidRef,
    },
    MyRequestResponse {
        bid: BidRef,
    },
}

/// Everything type-dependent about an event. Push bodies, emails and the
/// stored payload are all read from here.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    pub body: String,
    pub link_path: String,
    pub button_text: &'static str,
    pub data: Value,
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::ChatMessages { .. } => NotificationKind::ChatMessages,
            NotificationEvent::PurchasedMyListing { .. } => NotificationKind::PurchasedMyListing,
            NotificationEvent::BidOnMyListing { .. } => NotificationKind::BidOnMyListing,
            NotificationEvent::MyOfferAccepted { .. } => NotificationKind::MyOfferAccepted,
            NotificationEvent::MyOfferDeclined { .. } => NotificationKind::MyOfferDeclined,
            NotificationEvent::MyRequestResponse { .. } => NotificationKind::MyRequestResponse,
        }
    }

    pub fn describe(&self, sender_username: &str) -> EventDescriptor {
        match self {
            NotificationEvent::ChatMessages { chat_room_id } => EventDescriptor {
                body: format!("{} sent you a message", sender_username),
                link_path: format!("/chat/{}", chat_room_id),
                button_text: "View Message",
                data: json!({ "chatRoomID": chat_room_id }),
            },
            NotificationEvent::PurchasedMyListing { trade } => EventDescriptor {
                body: format!(
                    "{} purchased {}",
                    sender_username, trade.listing_reward.title
                ),
                link_path: format!("/trade/{}", trade.id),
                button_text: "View Trade",
                data: json!({
                    "tradeID": trade.id,
                    "listing_reward": listing_reward_data(&trade.listing_reward),
                }),
            },
            NotificationEvent::BidOnMyListing { bid } => EventDescriptor {
                body: format!("{} bid on {}", sender_username, bid.listing_reward.title),
                link_path: bid_link(bid),
                button_text: "View Bid",
                data: bid_data(bid),
            },
            NotificationEvent::MyOfferAccepted { bid, trade_id } => {
                let mut data = bid_data(bid);
                data["tradeID"] = json!(trade_id);

                EventDescriptor {
                    body: format!(
                        "{} accepted your offer on {}",
                        sender_username, bid.listing_reward.title
                    ),
                    link_path: format!("/trade/{}", trade_id),
                    button_text: "View Trade",
                    data,
                }
            }
            NotificationEvent::MyOfferDeclined { bid } => EventDescriptor {
                body: format!(
                    "{} declined your offer on {}",
                    sender_username, bid.listing_reward.title
                ),
                link_path: bid_link(bid),
                button_text: "View Listing",
                data: bid_data(bid),
            },
            NotificationEvent::MyRequestResponse { bid } => EventDescriptor {
                body: format!(
                    "{} responded to your request {}",
                    sender_username, bid.listing_reward.title
                ),
                link_path: bid_link(bid),
                button_text: "View Response",
                data: bid_data(bid),
            },
        }
    }
}

fn listing_reward_data(listing_reward: &ListingRewardRef) -> Value {
    json!({ "id": listing_reward.id, "title": listing_reward.title })
}

fn bid_data(bid: &BidRef) -> Value {
    json!({
        "bidID": bid.id,
        "listing_reward": listing_reward_data(&bid.listing_reward),
    })
}

fn bid_link(bid: &BidRef) -> String {
    format!("/listing/{}#{}", bid.listing_reward.id, bid.id)
}
