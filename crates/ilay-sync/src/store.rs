use ilay_types::Message;

/// The local, ordered view of one conversation.
///
/// Ordered by `(created_at, id)` ascending, never two entries with the same
/// id. The merge operations are written so that duplicate delivery and
/// reordering across insert/update/delete cannot corrupt state:
///
/// - insert of an existing id replaces it (duplicate delivery, echo races)
/// - update of an absent id is a no-op (update-before-insert)
/// - delete of an absent id is a no-op (delete-after-delete, foreign rooms)
///
/// Two racing updates to the same id resolve last-applied-wins; that is the
/// documented policy, not a defect.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a freshly fetched window. Dedupes by id
    /// (last one wins) and restores sort order regardless of input order.
    pub fn seed(&mut self, messages: Vec<Message>) {
        self.messages.clear();
        for message in messages {
            self.insert(message);
        }
    }

    /// Idempotent insert: an entry with the same id is replaced, otherwise
    /// the message lands at its timestamp-ordered position.
    pub fn insert(&mut self, message: Message) {
        self.messages.retain(|m| m.id != message.id);
        let at = self
            .messages
            .partition_point(|m| (m.created_at, m.id) <= (message.created_at, message.id));
        self.messages.insert(at, message);
    }

    /// Replace the entry with the same id; no-op if absent.
    pub fn update(&mut self, message: Message) {
        let Some(at) = self.messages.iter().position(|m| m.id == message.id) else {
            return;
        };
        if self.messages[at].created_at == message.created_at {
            self.messages[at] = message;
        } else {
            // created_at changed: reinsert so the order stays intact.
            self.insert(message);
        }
    }

    /// Remove the entry with this id; no-op if absent.
    pub fn delete(&mut self, id: i64) {
        self.messages.retain(|m| m.id != id);
    }

    pub fn get(&self, id: i64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
