//! Transport Events
//!
//! Events pushed by the external real-time transport into the chat-state
//! core. These carry exactly the boundary payloads: new messages, history
//! snapshots, typing changes, and connection signals.
//!
//! # Design Philosophy
//!
//! The transport is a "dumb" pipe that forwards what the server pushed. It
//! does not interpret events - it hands them to [`ChatState::apply`] and the
//! state decides what each one means. Payload shape validation beyond the
//! type system is the transport's responsibility.
//!
//! [`ChatState::apply`]: crate::state::ChatState::apply

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ids::{ConversationKey, ProjectId, UserId};
use crate::message::ChatMessage;
use crate::state::SharedChatState;

/// Events from the real-time transport to the chat state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TransportEvent {
    // ============================================
    // Connection Signals
    // ============================================
    /// Transport established a connection
    Connected,

    /// Transport lost its connection
    Disconnected,

    // ============================================
    // Conversation Deliveries
    // ============================================
    /// A single live message for one conversation
    MessageReceived {
        /// Conversation the message belongs to
        key: ConversationKey,
        /// The delivered message
        message: ChatMessage,
    },

    /// Authoritative history for one conversation
    HistorySnapshot {
        /// Conversation the snapshot belongs to
        key: ConversationKey,
        /// The full ordered history (caller contract: already sorted)
        messages: Vec<ChatMessage>,
    },

    // ============================================
    // Presence
    // ============================================
    /// A user's typing state changed
    TypingChanged {
        /// Project the typing indicator belongs to
        project: ProjectId,
        /// The user whose state changed
        user: UserId,
        /// Whether the user is now typing
        typing: bool,
    },
}

impl TransportEvent {
    /// The conversation key this event targets, if it has one
    #[must_use]
    pub fn conversation_key(&self) -> Option<&ConversationKey> {
        match self {
            Self::MessageReceived { key, .. } | Self::HistorySnapshot { key, .. } => Some(key),
            Self::Connected | Self::Disconnected | Self::TypingChanged { .. } => None,
        }
    }

    /// Short name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::MessageReceived { .. } => "MessageReceived",
            Self::HistorySnapshot { .. } => "HistorySnapshot",
            Self::TypingChanged { .. } => "TypingChanged",
        }
    }
}

/// Drain transport events from a channel into the shared state
///
/// Transports that deliver over a [`mpsc`] channel spawn this as their pump
/// task; it runs until the sending side is dropped. Mutations happen one
/// event at a time, preserving the single-writer model.
pub async fn pump_events(state: SharedChatState, mut rx: mpsc::Receiver<TransportEvent>) {
    while let Some(event) = rx.recv().await {
        state.apply(event);
    }
    tracing::debug!("Transport event channel closed, pump exiting");
}
