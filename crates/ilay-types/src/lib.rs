pub mod conversation;
pub mod events;
pub mod models;

pub use conversation::ConversationKey;
pub use events::StreamEvent;
pub use models::{BanRecord, BanTarget, Message, MessageRecord, NewMessage, ReactionMap};
