//! Chat State
//!
//! The single state object owned by the application's composition root. It
//! bundles the three independent pieces of per-conversation state - ordered
//! message lists, typing sets, and connectivity/loading flags - behind one
//! mutation entry point for transport pushes.
//!
//! # Design Philosophy
//!
//! There is no global singleton: whoever composes the application creates a
//! [`ChatState`] and hands it (or a [`SharedChatState`] clone) to the layers
//! that need read or mutate access. Mutations are synchronous and never
//! suspend; the cooperative single-writer model of the surrounding event loop
//! is preserved by keeping every critical section short and lock-free of
//! `.await` points.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::ChatStateConfig;
use crate::events::TransportEvent;
use crate::ids::{ConversationKey, ProjectId};
use crate::message::ChatMessage;
use crate::store::MessageStore;
use crate::typing::{TypingStatus, TypingTracker};

/// All chat state for one process
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    /// Ordered per-conversation message lists
    messages: MessageStore,
    /// Per-project typing sets
    typing: TypingTracker,
    /// Transport connection state
    connected: bool,
    /// Per-conversation send-in-flight flags
    loading: HashMap<ConversationKey, bool>,
}

impl ChatState {
    /// Create empty state with default behavior
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty state configured from [`ChatStateConfig`]
    #[must_use]
    pub fn with_config(config: &ChatStateConfig) -> Self {
        Self {
            messages: if config.normalize_history {
                MessageStore::normalizing()
            } else {
                MessageStore::new()
            },
            typing: TypingTracker::new(),
            connected: false,
            loading: HashMap::new(),
        }
    }

    /// Route one transport push to the owning component
    pub fn apply(&mut self, event: TransportEvent) {
        tracing::debug!(event = event.name(), "Applying transport event");
        match event {
            TransportEvent::Connected => self.connected = true,
            TransportEvent::Disconnected => self.connected = false,
            TransportEvent::MessageReceived { key, message } => {
                self.messages.append(&key, message);
            }
            TransportEvent::HistorySnapshot { key, messages } => {
                self.messages.replace_all(&key, messages);
            }
            TransportEvent::TypingChanged {
                project,
                user,
                typing,
            } => {
                self.typing.upsert(
                    &project,
                    TypingStatus {
                        user,
                        typing,
                    },
                );
            }
        }
    }

    /// The message store
    #[must_use]
    pub fn store(&self) -> &MessageStore {
        &self.messages
    }

    /// The message store (mutable)
    pub fn store_mut(&mut self) -> &mut MessageStore {
        &mut self.messages
    }

    /// The typing tracker
    #[must_use]
    pub fn typing(&self) -> &TypingTracker {
        &self.typing
    }

    /// The typing tracker (mutable)
    pub fn typing_mut(&mut self) -> &mut TypingTracker {
        &mut self.typing
    }

    /// Whether the transport currently reports a connection
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Set the connectivity flag directly (transports without the event
    /// plumbing call this from their connect/disconnect hooks)
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Whether a send is in flight for a conversation
    ///
    /// Advisory for UI gating only; concurrent sends to the same key are
    /// permitted.
    #[must_use]
    pub fn is_loading(&self, key: &ConversationKey) -> bool {
        self.loading.get(key).copied().unwrap_or(false)
    }

    /// Set or clear the send-in-flight flag for a conversation
    pub fn set_loading(&mut self, key: &ConversationKey, loading: bool) {
        if loading {
            self.loading.insert(key.clone(), true);
        } else {
            self.loading.remove(key);
        }
    }
}

/// Cheaply cloneable handle sharing one [`ChatState`] instance
///
/// Interleaved asynchronous callbacks (network responses, transport pushes)
/// mutate through short write-lock critical sections; rendering reads take
/// the read lock or clone a snapshot out.
#[derive(Clone, Debug, Default)]
pub struct SharedChatState {
    inner: Arc<RwLock<ChatState>>,
}

impl SharedChatState {
    /// Wrap a state object created at the composition root
    #[must_use]
    pub fn new(state: ChatState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Acquire the read lock
    pub fn read(&self) -> RwLockReadGuard<'_, ChatState> {
        self.inner.read()
    }

    /// Acquire the write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.inner.write()
    }

    /// Route one transport push to the shared state
    pub fn apply(&self, event: TransportEvent) {
        self.write().apply(event);
    }

    /// Whether the transport currently reports a connection
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.read().is_connected()
    }

    /// Whether a send is in flight for a conversation
    #[must_use]
    pub fn is_loading(&self, key: &ConversationKey) -> bool {
        self.read().is_loading(key)
    }

    /// Clone out the ordered messages for a conversation (for rendering)
    #[must_use]
    pub fn messages_snapshot(&self, key: &ConversationKey) -> Vec<ChatMessage> {
        self.read().store().messages(key).to_vec()
    }

    /// Clone out the active typists for a project (for rendering)
    #[must_use]
    pub fn typists_snapshot(&self, project: &ProjectId) -> Vec<TypingStatus> {
        self.read().typing().typists(project).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{MessageId, UserId};
    use crate::message::{ChatMessage, MessageRole};
    use pretty_assertions::assert_eq;

    fn msg(id: &str, ts: i64) -> ChatMessage {
        ChatMessage::with_timestamp(MessageId::new(id), MessageRole::Assistant, id, ts)
    }

    #[test]
    fn test_connection_events_toggle_flag() {
        let mut state = ChatState::new();
        assert!(!state.is_connected());

        state.apply(TransportEvent::Connected);
        assert!(state.is_connected());

        state.apply(TransportEvent::Disconnected);
        assert!(!state.is_connected());
    }

    #[test]
    fn test_message_events_route_to_store() {
        let mut state = ChatState::new();
        let key = ConversationKey::new("p1", "a1");

        state.apply(TransportEvent::HistorySnapshot {
            key: key.clone(),
            messages: vec![msg("m1", 10), msg("m2", 20)],
        });
        state.apply(TransportEvent::MessageReceived {
            key: key.clone(),
            message: msg("m3", 15),
        });

        let ids: Vec<_> = state
            .store()
            .messages(&key)
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["m1", "m3", "m2"]);
    }

    #[test]
    fn test_typing_events_route_to_tracker() {
        let mut state = ChatState::new();
        let project = ProjectId::new("p1");

        state.apply(TransportEvent::TypingChanged {
            project: project.clone(),
            user: UserId::new("u1"),
            typing: true,
        });
        assert!(state.typing().is_typing(&project, &UserId::new("u1")));

        state.apply(TransportEvent::TypingChanged {
            project: project.clone(),
            user: UserId::new("u1"),
            typing: false,
        });
        assert!(state.typing().typists(&project).is_empty());
    }

    #[test]
    fn test_loading_flags_per_key() {
        let mut state = ChatState::new();
        let key_a = ConversationKey::new("p1", "a1");
        let key_b = ConversationKey::new("p2", "a2");

        state.set_loading(&key_a, true);
        assert!(state.is_loading(&key_a));
        assert!(!state.is_loading(&key_b));

        state.set_loading(&key_a, false);
        assert!(!state.is_loading(&key_a));
    }

    #[test]
    fn test_shared_handle_shares_instance() {
        let shared = SharedChatState::new(ChatState::new());
        let clone = shared.clone();
        let key = ConversationKey::new("p1", "a1");

        clone.apply(TransportEvent::MessageReceived {
            key: key.clone(),
            message: msg("m1", 10),
        });

        assert_eq!(shared.messages_snapshot(&key).len(), 1);
    }

    #[test]
    fn test_with_config_normalizes_history() {
        let config = ChatStateConfig {
            normalize_history: true,
            ..ChatStateConfig::default()
        };
        let mut state = ChatState::with_config(&config);
        let key = ConversationKey::new("p1", "a1");

        state.apply(TransportEvent::HistorySnapshot {
            key: key.clone(),
            messages: vec![msg("m2", 20), msg("m1", 10)],
        });

        let ts: Vec<_> = state.store().messages(&key).iter().map(|m| m.timestamp).collect();
        assert_eq!(ts, vec![10, 20]);
    }
}
