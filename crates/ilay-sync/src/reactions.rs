use uuid::Uuid;

use ilay_types::ReactionMap;

/// Toggle `actor`'s reaction with `emoji`: present -> removed, absent ->
/// added. When the last reactor for an emoji leaves, the emoji key is dropped
/// entirely — a reaction map never holds an empty set.
///
/// Pure: returns the updated map, the input is untouched. The session submits
/// the result to the persistence service and lets the echoed update event
/// mutate the store, so repeated identical toggles cancel out.
pub fn toggle(reactions: &ReactionMap, emoji: &str, actor: Uuid) -> ReactionMap {
    let mut updated = reactions.clone();

    let set = updated.entry(emoji.to_string()).or_default();
    if !set.remove(&actor) {
        set.insert(actor);
    }

    if updated.get(emoji).is_some_and(|set| set.is_empty()) {
        updated.remove(emoji);
    }

    updated
}
