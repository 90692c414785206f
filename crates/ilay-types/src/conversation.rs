use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a room. A room is a pure function of its participants —
/// no room entity exists anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "room", rename_all = "lowercase")]
pub enum ConversationKey {
    /// The single global room (messages with no receiver).
    Global,
    /// A direct room between two users. The pair is unordered; construct
    /// via [`ConversationKey::direct`] so the stored order is normalized.
    Direct { a: Uuid, b: Uuid },
}

impl ConversationKey {
    /// Build the key for a direct room. `direct(x, y) == direct(y, x)`.
    pub fn direct(x: Uuid, y: Uuid) -> Self {
        if x <= y {
            Self::Direct { a: x, b: y }
        } else {
            Self::Direct { a: y, b: x }
        }
    }

    /// Does a message with this (author, receiver) pair belong to this room?
    pub fn admits(&self, author_id: Uuid, receiver_id: Option<Uuid>) -> bool {
        match self {
            Self::Global => receiver_id.is_none(),
            Self::Direct { a, b } => match receiver_id {
                Some(recv) => {
                    (author_id == *a && recv == *b) || (author_id == *b && recv == *a)
                }
                None => false,
            },
        }
    }

    /// The receiver id to stamp on an outgoing message from `me`.
    /// None in the global room.
    pub fn peer_of(&self, me: Uuid) -> Option<Uuid> {
        match self {
            Self::Global => None,
            Self::Direct { a, b } => {
                if me == *a {
                    Some(*b)
                } else {
                    Some(*a)
                }
            }
        }
    }
}
