use serde::{Deserialize, Serialize};

use crate::models::MessageRecord;

/// Change notifications pushed by the event stream service.
///
/// Delivery is at-least-once and unordered across kinds for the same id;
/// the store's merge algebra is written to absorb duplicate inserts,
/// update-before-insert and delete-after-update without corruption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum StreamEvent {
    /// A new row was appended.
    Insert(MessageRecord),

    /// An existing row changed (reaction toggles arrive this way).
    Update(MessageRecord),

    /// A row was removed. The transport only carries the id of the old row.
    Delete { id: i64 },
}
