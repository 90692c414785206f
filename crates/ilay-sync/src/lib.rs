/// ilay message synchronization engine
///
/// Keeps a local, ordered view of one conversation consistent with a remote
/// event stream of inserts/updates/deletes. A single session task owns the
/// store and applies every mutation — commands from the UI and events from
/// the stream — one at a time in arrival order, so there are no shared-memory
/// races and the merge order per conversation is deterministic.
///
/// The collaborators (persistence/query service, event stream, ban directory,
/// IP lookup) are traits; the engine never talks to a concrete backend.
pub mod config;
pub mod cooldown;
pub mod error;
pub mod reactions;
pub mod reply;
pub mod service;
pub mod session;
pub mod store;

pub use config::SyncConfig;
pub use error::{SendError, SubscriptionError};
pub use service::{BanDirectory, EventSource, IpLookup, MessageService, Subscription};
pub use session::{ChatSession, ConversationView, Identity, SessionHandle};
pub use store::MessageStore;
