//! Ordered Message Store
//!
//! Per-conversation message lists kept in non-decreasing timestamp order at
//! all times, even when the transport delivers messages out of order.
//!
//! # Design Philosophy
//!
//! The common case is in-order delivery, so [`MessageStore::append`] takes an
//! O(1) fast path whenever the new message is not older than the current tail.
//! A late delivery falls through to a binary search over the already-sorted
//! list and an indexed insert. Final order therefore depends only on
//! timestamp values, never on arrival order.
//!
//! No operation here can fail: an unknown key reads as an empty list, and an
//! unknown message id makes `update`/`remove` a no-op. Stale callbacks racing
//! a `clear` are harmless by construction.

use std::collections::HashMap;

use crate::ids::{ConversationKey, MessageId};
use crate::message::{ChatMessage, MessagePatch};

/// Keyed collection of ordered per-conversation message lists
#[derive(Clone, Debug, Default)]
pub struct MessageStore {
    /// One ordered list per conversation key
    conversations: HashMap<ConversationKey, Vec<ChatMessage>>,
    /// Whether history snapshots are re-sorted on install
    normalize_history: bool,
}

impl MessageStore {
    /// Create an empty store that trusts the ordering of history snapshots
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that stably re-sorts history snapshots by
    /// timestamp on install
    #[must_use]
    pub fn normalizing() -> Self {
        Self {
            conversations: HashMap::new(),
            normalize_history: true,
        }
    }

    /// Insert a delivered message, preserving timestamp order
    ///
    /// Fast path: empty list or `message.timestamp` at or past the tail's
    /// timestamp appends at the end. Slow path: binary search for the first
    /// position whose timestamp is not below the new message's, then an
    /// indexed insert. The inserted message is marked confirmed either way.
    pub fn append(&mut self, key: &ConversationKey, mut message: ChatMessage) {
        message.pending = false;

        let list = self.conversations.entry(key.clone()).or_default();
        match list.last() {
            Some(last) if message.timestamp < last.timestamp => {
                let index = list.partition_point(|m| m.timestamp < message.timestamp);
                tracing::debug!(
                    key = %key,
                    index,
                    len = list.len(),
                    "Out-of-order delivery, inserting mid-list"
                );
                list.insert(index, message);
            }
            _ => list.push(message),
        }
    }

    /// Discard the list for a key and install a history snapshot
    ///
    /// Every entry's pending flag is cleared. The snapshot is installed
    /// verbatim unless the store was built with [`MessageStore::normalizing`],
    /// in which case it is stably sorted by timestamp first.
    pub fn replace_all(&mut self, key: &ConversationKey, mut messages: Vec<ChatMessage>) {
        for message in &mut messages {
            message.pending = false;
        }
        if self.normalize_history {
            messages.sort_by_key(|m| m.timestamp);
        }
        tracing::debug!(key = %key, count = messages.len(), "Installed history snapshot");
        self.conversations.insert(key.clone(), messages);
    }

    /// Merge a patch into the message with the given id
    ///
    /// Returns whether a message was found. The message keeps its list
    /// position even if the patch changes its timestamp.
    pub fn update(&mut self, key: &ConversationKey, id: &MessageId, patch: &MessagePatch) -> bool {
        let Some(message) = self
            .conversations
            .get_mut(key)
            .and_then(|list| list.iter_mut().find(|m| &m.id == id))
        else {
            return false;
        };
        patch.apply_to(message);
        true
    }

    /// Remove the message with the given id
    ///
    /// Returns whether a message was removed.
    pub fn remove(&mut self, key: &ConversationKey, id: &MessageId) -> bool {
        let Some(list) = self.conversations.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|m| &m.id != id);
        list.len() != before
    }

    /// Insert an optimistic user message stamped with the current time
    ///
    /// The message is always the newest in its list, so it goes straight onto
    /// the tail with its pending flag intact. Returns the synthesized id for
    /// later reconciliation.
    pub fn add_optimistic(
        &mut self,
        key: &ConversationKey,
        content: impl Into<String>,
    ) -> MessageId {
        let message = ChatMessage::optimistic(content);
        let id = message.id.clone();
        self.conversations.entry(key.clone()).or_default().push(message);
        tracing::debug!(key = %key, id = %id, "Added optimistic message");
        id
    }

    /// Empty the list for a key
    pub fn clear(&mut self, key: &ConversationKey) {
        if let Some(list) = self.conversations.get_mut(key) {
            list.clear();
        }
    }

    /// The ordered messages for a key (empty for an unknown key)
    #[must_use]
    pub fn messages(&self, key: &ConversationKey) -> &[ChatMessage] {
        self.conversations.get(key).map_or(&[], Vec::as_slice)
    }

    /// Look up a single message by id
    #[must_use]
    pub fn message(&self, key: &ConversationKey, id: &MessageId) -> Option<&ChatMessage> {
        self.conversations
            .get(key)
            .and_then(|list| list.iter().find(|m| &m.id == id))
    }

    /// Number of messages held for a key
    #[must_use]
    pub fn len(&self, key: &ConversationKey) -> usize {
        self.conversations.get(key).map_or(0, Vec::len)
    }

    /// Whether a key holds no messages
    #[must_use]
    pub fn is_empty(&self, key: &ConversationKey) -> bool {
        self.len(key) == 0
    }

    /// Number of conversation keys with state (cleared keys included)
    #[must_use]
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;
    use pretty_assertions::assert_eq;

    fn msg(id: &str, ts: i64) -> ChatMessage {
        ChatMessage::with_timestamp(MessageId::new(id), MessageRole::Assistant, id, ts)
    }

    fn timestamps(store: &MessageStore, key: &ConversationKey) -> Vec<i64> {
        store.messages(key).iter().map(|m| m.timestamp).collect()
    }

    #[test]
    fn test_in_order_appends_stay_sorted() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");

        store.append(&key, msg("m1", 10));
        store.append(&key, msg("m2", 20));
        store.append(&key, msg("m3", 20));

        assert_eq!(timestamps(&store, &key), vec![10, 20, 20]);
    }

    #[test]
    fn test_out_of_order_delivery_is_reordered() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");

        store.append(&key, msg("m1", 100));
        store.append(&key, msg("m2", 50));
        store.append(&key, msg("m3", 75));

        assert_eq!(timestamps(&store, &key), vec![50, 75, 100]);
    }

    #[test]
    fn test_every_permutation_yields_same_order() {
        // Property: append order never affects final order for distinct
        // timestamps. Exhaustive over all 24 permutations of four messages.
        let base = [10, 20, 30, 40];
        let mut orders = Vec::new();
        permutations(&base, &mut Vec::new(), &mut orders);
        assert_eq!(orders.len(), 24);

        for order in orders {
            let mut store = MessageStore::new();
            let key = ConversationKey::new("p", "a");
            for ts in &order {
                store.append(&key, msg(&format!("m{ts}"), *ts));
            }
            assert_eq!(timestamps(&store, &key), vec![10, 20, 30, 40]);
        }
    }

    fn permutations(rest: &[i64], prefix: &mut Vec<i64>, out: &mut Vec<Vec<i64>>) {
        if rest.is_empty() {
            out.push(prefix.clone());
            return;
        }
        for (i, &ts) in rest.iter().enumerate() {
            let mut remaining = rest.to_vec();
            remaining.remove(i);
            prefix.push(ts);
            permutations(&remaining, prefix, out);
            prefix.pop();
        }
    }

    #[test]
    fn test_order_invariant_holds_after_every_append() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");

        for (i, ts) in [30, 10, 30, 5, 20, 10, 40].iter().enumerate() {
            store.append(&key, msg(&format!("m{i}"), *ts));
            let ts_list = timestamps(&store, &key);
            assert!(
                ts_list.windows(2).all(|w| w[0] <= w[1]),
                "list out of order after append #{i}: {ts_list:?}"
            );
        }
    }

    #[test]
    fn test_append_clears_pending() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");

        let mut delivered = msg("m1", 10);
        delivered.pending = true;
        store.append(&key, delivered);

        assert!(!store.messages(&key)[0].pending);
    }

    #[test]
    fn test_replace_all_installs_verbatim() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");
        store.append(&key, msg("old", 1));

        // Unordered snapshot is trusted as-is by default
        store.replace_all(&key, vec![msg("m2", 20), msg("m1", 10)]);
        assert_eq!(timestamps(&store, &key), vec![20, 10]);
    }

    #[test]
    fn test_replace_all_normalizing_sorts() {
        let mut store = MessageStore::normalizing();
        let key = ConversationKey::new("p", "a");

        store.replace_all(&key, vec![msg("m2", 20), msg("m1", 10), msg("m3", 15)]);
        assert_eq!(timestamps(&store, &key), vec![10, 15, 20]);
    }

    #[test]
    fn test_optimistic_reconciliation_by_update() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");

        let id = store.add_optimistic(&key, "hello");
        assert!(store.messages(&key)[0].pending);

        let updated = store.update(
            &key,
            &id,
            &MessagePatch::new().pending(false).error("failed"),
        );
        assert!(updated);

        let list = store.messages(&key);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].content, "hello");
        assert_eq!(list[0].error.as_deref(), Some("failed"));
        assert!(!list[0].pending);
    }

    #[test]
    fn test_update_does_not_resort() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");
        store.append(&key, msg("m1", 10));
        store.append(&key, msg("m2", 20));

        // Patching m1's timestamp past m2 leaves it in place
        store.update(&key, &MessageId::new("m1"), &MessagePatch::new().timestamp(99));
        let ids: Vec<_> = store.messages(&key).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[test]
    fn test_unknown_key_and_id_are_noops() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");
        let ghost = ConversationKey::new("p", "ghost");

        store.append(&key, msg("m1", 10));

        assert!(!store.update(&ghost, &MessageId::new("m1"), &MessagePatch::new().pending(false)));
        assert!(!store.remove(&key, &MessageId::new("nope")));
        store.clear(&ghost);

        assert_eq!(store.len(&key), 1);
        assert!(store.messages(&ghost).is_empty());
    }

    #[test]
    fn test_remove_filters_by_id() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");
        store.append(&key, msg("m1", 10));
        store.append(&key, msg("m2", 20));

        assert!(store.remove(&key, &MessageId::new("m1")));
        assert_eq!(store.len(&key), 1);
        assert_eq!(store.messages(&key)[0].id.as_str(), "m2");
    }

    #[test]
    fn test_keys_are_independent() {
        let mut store = MessageStore::new();
        let key_a = ConversationKey::new("p1", "a1");
        let key_b = ConversationKey::new("p2", "a2");

        store.append(&key_a, msg("m1", 10));
        store.add_optimistic(&key_b, "other");
        store.clear(&key_b);

        assert_eq!(store.len(&key_a), 1);
        assert!(store.is_empty(&key_b));
    }

    #[test]
    fn test_clear_empties_list() {
        let mut store = MessageStore::new();
        let key = ConversationKey::new("p", "a");
        store.append(&key, msg("m1", 10));

        store.clear(&key);
        assert!(store.is_empty(&key));

        // Appending after a clear starts a fresh ordered list
        store.append(&key, msg("m2", 5));
        assert_eq!(store.len(&key), 1);
    }
}
