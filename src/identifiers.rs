//! Type-safe identifiers for bridge entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Wraps | Purpose |
//! |------|-------|---------|
//! | [`RequestId`] | `Uuid` | Correlates a command or event with its reply |
//! | [`ChannelName`] | `Arc<str>` | Unique channel address |
//! | [`WebViewId`] | `String` | Host-assigned web view identity |

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Identifier correlating one request with its single reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for RequestId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// ChannelName
// ============================================================================

/// Unique name of a channel.
///
/// Cheap to clone; the registry keys channels by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(Arc<str>);

impl ChannelName {
    /// Creates a channel name.
    #[inline]
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Creates the conventional name `<prefix><id>`.
    #[inline]
    #[must_use]
    pub fn with_prefix(prefix: &str, id: &WebViewId) -> Self {
        Self::new(format!("{prefix}{id}"))
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ChannelName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChannelName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl Borrow<str> for ChannelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ChannelName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

// ============================================================================
// WebViewId
// ============================================================================

/// Identity the host assigns to a web view.
///
/// Hosts use either integers or strings; both render to the same textual
/// form used in channel names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebViewId(String);

impl WebViewId {
    /// Returns the identifier text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WebViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for WebViewId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for WebViewId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WebViewId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_serializes_as_uuid_string() {
        let id = RequestId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_channel_name_with_prefix() {
        let name = ChannelName::with_prefix("bridge_", &WebViewId::from(7));
        assert_eq!(name.as_str(), "bridge_7");
        assert_eq!(name.to_string(), "bridge_7");
    }

    #[test]
    fn test_channel_name_serializes_as_plain_string() {
        let name = ChannelName::new("bridge_7");

        let json = serde_json::to_string(&name).expect("serialize");
        assert_eq!(json, "\"bridge_7\"");

        let back: ChannelName = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, name);
    }

    #[test]
    fn test_webview_id_from_string() {
        let id = WebViewId::from("main");
        assert_eq!(id.as_str(), "main");
    }
}
