//! Bridge configuration.
//!
//! Provides a type-safe interface for configuring channel naming, reply
//! timeouts and pending-reply limits.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webview_bridge::BridgeOptions;
//!
//! let options = BridgeOptions::new()
//!     .with_channel_prefix("my_app/webview_")
//!     .with_command_timeout(Duration::from_secs(5))
//!     .with_max_pending_replies(32);
//! ```
//!
//! Options can also be read from JSON, with the timeout in milliseconds:
//!
//! ```ignore
//! let options = BridgeOptions::from_json(r#"{"commandTimeoutMs": 5000}"#)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Default channel name prefix, followed by the web view ID.
pub const DEFAULT_CHANNEL_PREFIX: &str = "com.pichillilorenzo/flutter_inappwebview_";

/// Default time a host waits for a command reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on outstanding replies per channel.
pub const DEFAULT_MAX_PENDING_REPLIES: usize = 100;

// ============================================================================
// BridgeOptions
// ============================================================================

/// Bridge configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeOptions {
    /// Prefix of generated channel names.
    pub channel_prefix: String,

    /// How long a host endpoint waits for a command reply.
    #[serde(rename = "commandTimeoutMs", with = "duration_ms")]
    pub command_timeout: Duration,

    /// Maximum outstanding replies per channel, in each direction.
    pub max_pending_replies: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl BridgeOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            max_pending_replies: DEFAULT_MAX_PENDING_REPLIES,
        }
    }

    /// Parses options from JSON; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl BridgeOptions {
    /// Sets the channel name prefix.
    #[inline]
    #[must_use]
    pub fn with_channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    /// Sets the command reply timeout.
    #[inline]
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the outstanding reply cap. Zero is raised to one.
    #[inline]
    #[must_use]
    pub fn with_max_pending_replies(mut self, max: usize) -> Self {
        self.max_pending_replies = max.max(1);
        self
    }
}

// ============================================================================
// Serde Helpers
// ============================================================================

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ============================================================================
// Tests
// ============================================================================
