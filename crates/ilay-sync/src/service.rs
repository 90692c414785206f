use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use ilay_types::{BanRecord, ConversationKey, MessageRecord, NewMessage, ReactionMap, StreamEvent};

/// Persistence/query service for messages. Content crossing this boundary is
/// always ciphertext; the engine decodes on fetch and encodes on append.
#[async_trait]
pub trait MessageService: Send + Sync {
    /// The most recent `limit` messages of a conversation, oldest first.
    async fn fetch(&self, key: &ConversationKey, limit: u32) -> Result<Vec<MessageRecord>>;

    /// Append a new message. Id and created_at are assigned server-side and
    /// come back through the event stream, not through this call.
    async fn append(&self, message: NewMessage) -> Result<()>;

    /// Replace the reaction map of a message.
    async fn update_reactions(&self, id: i64, reactions: ReactionMap) -> Result<()>;

    /// Delete a message.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// A live event stream for one conversation topic. Dropping it unsubscribes;
/// the sender side closing (receiver yields None) means the stream was lost
/// and the session will reconnect and reseed.
pub struct Subscription {
    pub events: mpsc::Receiver<StreamEvent>,
}

/// Event stream service: one logical stream per conversation topic.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self, key: &ConversationKey) -> Result<Subscription>;
}

/// Ban-list lookups. Both lookups fail open: `Err` is treated the same as
/// `None` (access permitted) so an unreachable ban service never blocks the
/// UI. A known bootstrap trade-off, documented, not a bug.
#[async_trait]
pub trait BanDirectory: Send + Sync {
    async fn ip_ban(&self, ip: &str) -> Result<Option<BanRecord>>;
    async fn user_ban(&self, user_id: Uuid) -> Result<Option<BanRecord>>;
}

/// Best-effort origin IP discovery, stamped on outgoing messages when it
/// answers within the configured bounded wait.
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn current_ip(&self) -> Result<String>;
}
