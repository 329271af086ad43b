//! Conversation Identifiers
//!
//! Newtype identifiers used throughout the chat-state core. Projects, agents,
//! and users are named by the surrounding application; the core treats their
//! ids as opaque strings and never parses them.
//!
//! # Design Philosophy
//!
//! A conversation is identified by the *pair* of project and agent, so the
//! pair is a first-class type ([`ConversationKey`]) rather than a joined
//! string. Keyed maps hash the pair directly; nothing ever has to split a
//! composite id back apart.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by client-generated message ids awaiting server confirmation
const PENDING_PREFIX: &str = "pending_";

/// Identifier for a project
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a project id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an agent within a project
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create an agent id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a user (typing indicators)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a user id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key identifying one conversation
///
/// Every piece of per-conversation state (message list, loading flag) is
/// scoped by this pair. Two keys that differ in either component share
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    /// Project the conversation belongs to
    pub project: ProjectId,
    /// Agent the conversation is with
    pub agent: AgentId,
}

impl ConversationKey {
    /// Create a key from project and agent ids
    pub fn new(project: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            project: ProjectId::new(project),
            agent: AgentId::new(agent),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display form only; never parsed back into components
        write!(f, "{}/{}", self.project, self.agent)
    }
}

/// Message identifier
///
/// Server-assigned ids arrive over the transport as opaque strings. Locally
/// synthesized optimistic messages carry a `pending_` id until the
/// authoritative response replaces or annotates them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a message id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh client-side id for an optimistic message
    #[must_use]
    pub fn pending() -> Self {
        Self(format!("{PENDING_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether this id was generated client-side and awaits confirmation
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.starts_with(PENDING_PREFIX)
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_ids_unique() {
        let id1 = MessageId::pending();
        let id2 = MessageId::pending();
        assert_ne!(id1, id2);
        assert!(id1.is_pending());
        assert!(id2.is_pending());
    }

    #[test]
    fn test_server_id_not_pending() {
        let id = MessageId::new("msg_42");
        assert!(!id.is_pending());
    }

    #[test]
    fn test_key_equality() {
        let a = ConversationKey::new("p1", "a1");
        let b = ConversationKey::new("p1", "a1");
        let c = ConversationKey::new("p1", "a2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_display() {
        let key = ConversationKey::new("proj", "agent");
        assert_eq!(format!("{key}"), "proj/agent");
    }
}
