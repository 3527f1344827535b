//! Inbound command requests and argument decoding.
//!
//! A [`CommandRequest`] lives for exactly one dispatch. Operations decode
//! their arguments through [`Arguments`]; every decode failure is an
//! [`Error::InvalidArgument`] which the dispatcher turns into a reply.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::value::{FromValue, Map, Value};

// ============================================================================
// Arguments
// ============================================================================

/// Typed key lookup on an argument map.
///
/// Optional lookups treat an explicit `null` the same as a missing key.
pub trait Arguments {
    /// Decodes a required key.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the key is missing, `null`, or has the
    /// wrong shape.
    fn required<T: FromValue>(&self, key: &str) -> Result<T>;

    /// Decodes an optional key.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the key is present with the wrong shape.
    fn optional<T: FromValue>(&self, key: &str) -> Result<Option<T>>;
}

impl Arguments for Map {
    fn required<T: FromValue>(&self, key: &str) -> Result<T> {
        match self.get(key) {
            None | Some(Value::Null) => Err(Error::missing_argument(key)),
            Some(value) => T::from_value(value).ok_or_else(|| Error::argument_type(key, T::EXPECTED)),
        }
    }

    fn optional<T: FromValue>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .ok_or_else(|| Error::argument_type(key, T::EXPECTED)),
        }
    }
}

// ============================================================================
// CommandRequest
// ============================================================================

/// A command from the host: method name plus argument map.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    /// Method name as received on the wire.
    pub method: String,

    /// Arguments keyed by name.
    pub arguments: Map,
}

impl CommandRequest {
    /// Creates a request.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, arguments: Map) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Creates a request from a raw arguments value.
    ///
    /// `null` is read as an empty map.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `arguments` is neither a map nor `null`.
    pub fn from_value(method: impl Into<String>, arguments: Value) -> Result<Self> {
        match arguments {
            Value::Map(map) => Ok(Self::new(method, map)),
            Value::Null => Ok(Self::new(method, Map::new())),
            other => Err(Error::invalid_argument(format!(
                "arguments must be a map, got {}",
                other.type_name()
            ))),
        }
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Arguments for CommandRequest {
    #[inline]
    fn required<T: FromValue>(&self, key: &str) -> Result<T> {
        self.arguments.required(key)
    }

    #[inline]
    fn optional<T: FromValue>(&self, key: &str) -> Result<Option<T>> {
        self.arguments.optional(key)
    }
}

// ============================================================================
// Tests
// ============================================================================
