//! Event message types.
//!
//! Events are notifications sent from the web view side to the host when
//! page state changes. Some events expect an answer (see
//! [`EventName::expects_reply`]).
//!
//! # Event Types
//!
//! | Event | Payload keys |
//! |-------|--------------|
//! | `onLoadStart`, `onLoadStop` | `url` |
//! | `shouldOverrideUrlLoading` | navigation action map |
//! | `onReceivedError` | `request`, `error` |
//! | `onReceivedHttpError` | `request`, `errorResponse` |
//! | `onTitleChanged` | `title` |
//! | `onUpdateVisitedHistory` | `url`, `isReload` |
//! | `onCallJsHandler` | `handlerName`, `args` |
//! | `onConsoleMessage` | `message`, `messageLevel` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::value::{Map, Value};

// ============================================================================
// EventName
// ============================================================================

/// Known outbound events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Page load started.
    LoadStart,
    /// Page load finished.
    LoadStop,
    /// Navigation about to happen; host decides.
    ShouldOverrideUrlLoading,
    /// Load failed.
    ReceivedError,
    /// Load got an HTTP error status.
    ReceivedHttpError,
    /// Document title changed.
    TitleChanged,
    /// History entry added or updated.
    UpdateVisitedHistory,
    /// Page script called a host handler.
    CallJsHandler,
    /// Page wrote to the console.
    ConsoleMessage,
}

impl EventName {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoadStart => "onLoadStart",
            Self::LoadStop => "onLoadStop",
            Self::ShouldOverrideUrlLoading => "shouldOverrideUrlLoading",
            Self::ReceivedError => "onReceivedError",
            Self::ReceivedHttpError => "onReceivedHttpError",
            Self::TitleChanged => "onTitleChanged",
            Self::UpdateVisitedHistory => "onUpdateVisitedHistory",
            Self::CallJsHandler => "onCallJsHandler",
            Self::ConsoleMessage => "onConsoleMessage",
        }
    }

    /// Returns `true` if the host is expected to answer.
    #[inline]
    #[must_use]
    pub const fn expects_reply(&self) -> bool {
        matches!(self, Self::ShouldOverrideUrlLoading | Self::CallJsHandler)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event
// ============================================================================

/// An unsolicited notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name.
    pub name: String,

    /// Event-specific data.
    pub payload: Map,
}

impl Event {
    /// Creates an event.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Map) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Returns the known event kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<EventName> {
        [
            EventName::LoadStart,
            EventName::LoadStop,
            EventName::ShouldOverrideUrlLoading,
            EventName::ReceivedError,
            EventName::ReceivedHttpError,
            EventName::TitleChanged,
            EventName::UpdateVisitedHistory,
            EventName::CallJsHandler,
            EventName::ConsoleMessage,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == self.name)
    }

    /// Gets a payload entry.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Gets an optional string from the payload.
    #[inline]
    #[must_use]
    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }

    /// Gets a string from the payload, empty if absent.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.get_optional_string(key).unwrap_or_default()
    }

    /// Gets an integer from the payload, 0 if absent.
    #[inline]
    #[must_use]
    pub fn get_i64(&self, key: &str) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or_default()
    }

    /// Gets an optional boolean from the payload.
    #[inline]
    #[must_use]
    pub fn get_optional_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

// ============================================================================
// Tests
// ============================================================================
