use ilay_types::Message;

use crate::store::MessageStore;

/// What to render for an unresolved reply parent: deleted, not yet fetched,
/// or outside the loaded window. Never an error.
pub const NOT_LOADED_PLACEHOLDER: &str = "message not loaded";

/// Resolve a message's reply parent against whatever is loaded locally.
/// A dangling `reply_to_id` yields `None`; callers render the placeholder.
pub fn resolve(store: &MessageStore, reply_to_id: Option<i64>) -> Option<&Message> {
    store.get(reply_to_id?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn msg(id: i64) -> Message {
        Message {
            id,
            created_at: Utc::now(),
            author_id: Uuid::new_v4(),
            author_username: "author".into(),
            receiver_id: None,
            content: "hi".into(),
            reply_to_id: None,
            reactions: Default::default(),
            origin_ip: None,
            image_url: None,
        }
    }

    #[test]
    fn resolves_a_loaded_parent() {
        let mut store = MessageStore::new();
        store.insert(msg(1));

        assert_eq!(resolve(&store, Some(1)).map(|m| m.id), Some(1));
    }

    #[test]
    fn dangling_reference_is_not_found_not_an_error() {
        let store = MessageStore::new();

        assert!(resolve(&store, Some(404)).is_none());
        assert!(resolve(&store, None).is_none());
    }

    #[test]
    fn deleted_parent_becomes_unresolved() {
        let mut store = MessageStore::new();
        store.insert(msg(1));
        store.delete(1);

        assert!(resolve(&store, Some(1)).is_none());
    }
}
