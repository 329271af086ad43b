//! TOML Configuration File Support
//!
//! Centralized configuration loading for the chat-state core, supporting a
//! TOML configuration file at `~/.config/parley/chatstate.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest
//! first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows the XDG Base Directory specification:
//! `$XDG_CONFIG_HOME/parley/chatstate.toml` (typically
//! `~/.config/parley/chatstate.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [history]
//! normalize = false
//! limit = 200
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding history normalization
const ENV_NORMALIZE_HISTORY: &str = "PARLEY_NORMALIZE_HISTORY";
/// Environment variable overriding the history page size
const ENV_HISTORY_LIMIT: &str = "PARLEY_HISTORY_LIMIT";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Resolved configuration for the chat-state core
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatStateConfig {
    /// Whether history snapshots are stably re-sorted by timestamp on
    /// install (default: trust the server's ordering)
    pub normalize_history: bool,
    /// Page size requested when fetching conversation history
    pub history_limit: usize,
}

impl Default for ChatStateConfig {
    fn default() -> Self {
        Self {
            normalize_history: false,
            history_limit: 200,
        }
    }
}

impl ChatStateConfig {
    /// Create configuration from environment variables over defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Apply environment variable overrides on top of this configuration
    #[must_use]
    fn overlay_env(mut self) -> Self {
        if let Ok(value) = std::env::var(ENV_NORMALIZE_HISTORY) {
            self.normalize_history = value == "1" || value.eq_ignore_ascii_case("true");
        }
        if let Some(limit) = std::env::var(ENV_HISTORY_LIMIT)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.history_limit = limit;
        }
        self
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// History section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryToml {
    /// Whether to re-sort history snapshots on install
    pub normalize: Option<bool>,

    /// Page size requested when fetching history
    pub limit: Option<usize>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatStateToml {
    /// History behavior
    pub history: HistoryToml,
}

impl ChatStateToml {
    /// Resolve the file values over defaults
    #[must_use]
    pub fn resolve(&self) -> ChatStateConfig {
        let defaults = ChatStateConfig::default();
        ChatStateConfig {
            normalize_history: self.history.normalize.unwrap_or(defaults.normalize_history),
            history_limit: self.history.limit.unwrap_or(defaults.history_limit),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Default configuration file path (`~/.config/parley/chatstate.toml`)
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("chatstate.toml"))
}

/// Load configuration from the default path, environment, and defaults
///
/// A missing file is not an error - defaults apply and environment variables
/// still override. A file that exists but cannot be read or parsed is
/// reported.
pub fn load_config() -> Result<ChatStateConfig, ConfigError> {
    match default_config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(ChatStateConfig::from_env()),
    }
}

/// Load configuration from an explicit file path, then apply environment
/// variable overrides
pub fn load_config_from_path(path: &Path) -> Result<ChatStateConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ChatStateToml = toml::from_str(&raw)?;
    tracing::debug!(path = %path.display(), "Loaded chat-state config file");
    Ok(file.resolve().overlay_env())
}
