//! Outbound Send Bridge
//!
//! The request/response side of the core: submitting a new message and
//! fetching authoritative history from the external API. The bridge exists to
//! cover the latency window between an outbound send and the eventual
//! authoritative response - an optimistic message is shown immediately and
//! reconciled (replaced or annotated) once the backend settles.
//!
//! # Design Philosophy
//!
//! A failed send never raises out of [`ChatClient::send`]: the optimistic
//! message stays visible with its error annotation, and retrying is simply a
//! fresh send if the caller chooses. The per-conversation loading flag is
//! advisory for UI gating, not a mutex - concurrent sends to the same
//! conversation interleave freely.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ChatStateConfig;
use crate::ids::{ConversationKey, MessageId};
use crate::message::{ChatMessage, MessagePatch};
use crate::state::SharedChatState;

/// Errors from fetching conversation history
///
/// History loading is the one fallible operation on the bridge: there is no
/// optimistic message to annotate, so the failure surfaces to the caller and
/// the previously held list is left untouched.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The backend request failed
    #[error("Failed to fetch history for {key}: {source}")]
    Fetch {
        /// Display form of the conversation key
        key: String,
        /// The underlying backend error
        source: anyhow::Error,
    },
}

/// External chat API
///
/// Implement this trait to connect the core to the surrounding application's
/// request/response layer. Implementations handle provider-specific details
/// (HTTP, auth, payload shapes).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit a message and wait for the authoritative stored message
    async fn send_message(
        &self,
        key: &ConversationKey,
        content: &str,
    ) -> anyhow::Result<ChatMessage>;

    /// Fetch up to `limit` messages of conversation history, oldest first
    async fn fetch_history(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> anyhow::Result<Vec<ChatMessage>>;
}

/// Bridges the shared chat state to a [`ChatBackend`]
#[derive(Clone, Debug)]
pub struct ChatClient<B> {
    state: SharedChatState,
    backend: Arc<B>,
    history_limit: usize,
}

impl<B: ChatBackend> ChatClient<B> {
    /// Create a client with default configuration
    pub fn new(state: SharedChatState, backend: B) -> Self {
        Self::with_config(state, backend, &ChatStateConfig::default())
    }

    /// Create a client honoring the given configuration
    pub fn with_config(state: SharedChatState, backend: B, config: &ChatStateConfig) -> Self {
        Self {
            state,
            backend: Arc::new(backend),
            history_limit: config.history_limit,
        }
    }

    /// The shared state this client mutates
    #[must_use]
    pub fn state(&self) -> &SharedChatState {
        &self.state
    }

    /// Send a message, showing it optimistically until the backend settles
    ///
    /// On success the optimistic entry is removed and the authoritative
    /// message takes its place through the ordered-append path. On failure
    /// the optimistic entry is kept and annotated with the error text. The
    /// conversation's loading flag is cleared on every path before this
    /// returns; the returned id identifies the message now in the list.
    pub async fn send(&self, key: &ConversationKey, content: impl Into<String>) -> MessageId {
        let content = content.into();

        let pending_id = {
            let mut state = self.state.write();
            state.set_loading(key, true);
            state.store_mut().add_optimistic(key, content.clone())
        };

        let result = self.backend.send_message(key, &content).await;

        let mut state = self.state.write();
        let final_id = match result {
            Ok(message) => {
                let id = message.id.clone();
                state.store_mut().remove(key, &pending_id);
                state.store_mut().append(key, message);
                id
            }
            Err(error) => {
                tracing::warn!(key = %key, %error, "Send failed, annotating optimistic message");
                state.store_mut().update(
                    key,
                    &pending_id,
                    &MessagePatch::new().pending(false).error(error.to_string()),
                );
                pending_id
            }
        };
        state.set_loading(key, false);
        final_id
    }

    /// Fetch history and install it as the conversation's list
    ///
    /// Returns the number of messages installed. On failure the previously
    /// held list is left untouched.
    pub async fn load_history(&self, key: &ConversationKey) -> Result<usize, HistoryError> {
        let messages = self
            .backend
            .fetch_history(key, self.history_limit)
            .await
            .map_err(|source| {
                tracing::warn!(key = %key, error = %source, "History fetch failed");
                HistoryError::Fetch {
                    key: key.to_string(),
                    source,
                }
            })?;

        let count = messages.len();
        self.state.write().store_mut().replace_all(key, messages);
        Ok(count)
    }
}
