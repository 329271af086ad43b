//! Chatstate Core - Headless Conversation State for Parley
//!
//! This crate owns the client-side conversation state of Parley, completely
//! independent of any UI framework or transport implementation. It can back a
//! TUI, web view, native GUI, or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Real-time transport                       │
//! │        (connect / disconnect, message + typing pushes)        │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                         TransportEvent
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                         CHAT STATE                            │
//! │  ┌───────────────────────────┴────────────────────────────┐   │
//! │  │                       ChatState                         │   │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │   │
//! │  │  │   Message    │  │    Typing    │  │ Connectivity │  │   │
//! │  │  │    Store     │  │   Tracker    │  │ + loading    │  │   │
//! │  │  └──────────────┘  └──────────────┘  └──────────────┘  │   │
//! │  └────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                     ChatClient (send bridge)
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                  Request/response backend                     │
//! │              (submit message, fetch history)                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatState`]: the state object owned by the composition root
//! - [`SharedChatState`]: cheaply cloneable handle sharing one instance
//! - [`MessageStore`]: per-conversation lists ordered by timestamp
//! - [`TypingTracker`]: per-project sets of users currently typing
//! - [`TransportEvent`]: inbound pushes from the real-time transport
//! - [`ChatClient`]: optimistic send bridge over a [`ChatBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use chatstate_core::{ChatClient, ChatState, ConversationKey, SharedChatState, TransportEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = SharedChatState::new(ChatState::new());
//!     let client = ChatClient::new(state.clone(), MyBackend::from_env());
//!     let key = ConversationKey::new("project-1", "agent-1");
//!
//!     // Transport pushes mutate the shared state
//!     state.apply(TransportEvent::Connected);
//!
//!     // History load, then an optimistic send
//!     client.load_history(&key).await.unwrap();
//!     let id = client.send(&key, "hello").await;
//!
//!     // Rendering reads a snapshot
//!     for message in state.messages_snapshot(&key) {
//!         // draw message
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`ids`]: project/agent/user/message identifiers and the composite
//!   conversation key
//! - [`message`]: the chat message type and field-wise patches
//! - [`store`]: the ordered message store (fast-path append, binary-search
//!   insert for late deliveries)
//! - [`typing`]: typing-status tracking
//! - [`events`]: inbound transport events
//! - [`state`]: the composition-root state object and shared handle
//! - [`outbound`]: the backend seam and optimistic send bridge
//! - [`config`]: TOML + environment configuration
//!
//! # No UI or Transport Dependencies
//!
//! This crate has **zero** dependencies on any UI framework, WebSocket
//! library, or HTTP client. It's pure state logic that can be driven from
//! anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod events;
pub mod ids;
pub mod message;
pub mod outbound;
pub mod state;
pub mod store;
pub mod typing;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, ChatStateConfig, ChatStateToml,
    ConfigError,
};
pub use events::{pump_events, TransportEvent};
pub use ids::{AgentId, ConversationKey, MessageId, ProjectId, UserId};
pub use message::{ChatMessage, MessagePatch, MessageRole};
pub use outbound::{ChatBackend, ChatClient, HistoryError};
pub use state::{ChatState, SharedChatState};
pub use store::MessageStore;
pub use typing::{TypingStatus, TypingTracker};
