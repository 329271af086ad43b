//! Chat Messages
//!
//! The message type held by the ordered store, plus the field-wise patch used
//! to reconcile optimistic sends once the authoritative response (or an
//! error) arrives.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ids::MessageId;

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// Human participant
    User,
    /// Agent response
    Assistant,
}

/// One chat turn
///
/// The `timestamp` (Unix milliseconds) is the sole ordering key within a
/// conversation. `pending` marks an optimistic message that has not been
/// confirmed by the server yet; `error` is attached in place of confirmation
/// when a send fails.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id within the conversation
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content (mutable for assistant messages while streaming)
    pub content: String,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: i64,
    /// Whether the message still awaits server confirmation
    #[serde(default)]
    pub pending: bool,
    /// Failure description attached after a failed send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(id: MessageId, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp: now_ms(),
            pending: false,
            error: None,
        }
    }

    /// Create a message with an explicit timestamp (transport deliveries
    /// carry their own creation time)
    pub fn with_timestamp(
        id: MessageId,
        role: MessageRole,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            timestamp,
            pending: false,
            error: None,
        }
    }

    /// Synthesize an optimistic user message awaiting confirmation
    #[must_use]
    pub fn optimistic(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::pending(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: now_ms(),
            pending: true,
            error: None,
        }
    }

    /// Whether the message carries a send failure
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Field-wise partial update for [`ChatMessage`]
///
/// Only the fields that were set are merged; everything else is left alone.
/// A timestamp change never moves the message within its list.
#[derive(Clone, Debug, Default)]
pub struct MessagePatch {
    content: Option<String>,
    timestamp: Option<i64>,
    pending: Option<bool>,
    error: Option<Option<String>>,
}

impl MessagePatch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replace the timestamp (the message keeps its list position)
    #[must_use]
    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set or clear the pending flag
    #[must_use]
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Attach a failure description
    #[must_use]
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(Some(error.into()));
        self
    }

    /// Remove a previously attached failure description
    #[must_use]
    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }

    /// Whether the patch carries no changes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.timestamp.is_none()
            && self.pending.is_none()
            && self.error.is_none()
    }

    /// Merge the set fields into a message
    pub fn apply_to(&self, message: &mut ChatMessage) {
        if let Some(ref content) = self.content {
            message.content.clone_from(content);
        }
        if let Some(timestamp) = self.timestamp {
            message.timestamp = timestamp;
        }
        if let Some(pending) = self.pending {
            message.pending = pending;
        }
        if let Some(ref error) = self.error {
            message.error.clone_from(error);
        }
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
