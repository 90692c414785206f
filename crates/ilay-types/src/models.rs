use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reactions on a message: emoji -> set of reactor user ids.
/// An emoji key is never present with an empty set.
pub type ReactionMap = HashMap<String, HashSet<Uuid>>;

/// A message as it travels and rests: `content` is always ciphertext here.
/// Decoding into a [`Message`] happens exactly once, on receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    /// None means the Global room; Some(peer) means a direct room.
    pub receiver_id: Option<Uuid>,
    pub content: String,
    #[serde(default)]
    pub reply_to_id: Option<i64>,
    #[serde(default)]
    pub reactions: ReactionMap,
    #[serde(default)]
    pub origin_ip: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A message in the local view: `content` is plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub receiver_id: Option<Uuid>,
    pub content: String,
    pub reply_to_id: Option<i64>,
    pub reactions: ReactionMap,
    pub origin_ip: Option<String>,
    pub image_url: Option<String>,
}

/// Payload for appending a new message. The id and created_at are assigned
/// by the server; `content` must already be ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub author_id: Uuid,
    pub author_username: String,
    pub receiver_id: Option<Uuid>,
    pub content: String,
    pub reply_to_id: Option<i64>,
    pub origin_ip: Option<String>,
}

/// A ban entry. Presence implies access denial; lookups fail open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanRecord {
    pub target: BanTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum BanTarget {
    Ip(String),
    User(Uuid),
}
