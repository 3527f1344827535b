//! Error types for the web-view bridge.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webview_bridge::{Error, Result};
//!
//! fn decode_steps(request: &CommandRequest) -> Result<i64> {
//!     let steps = request.required::<i64>("steps")?;
//!     Ok(steps)
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Dispatch | [`Error::InvalidArgument`], [`Error::NotImplemented`], [`Error::OperationFailed`] |
//! | Channel | [`Error::ChannelNotFound`], [`Error::DuplicateChannel`], [`Error::ChannelClosed`] |
//! | Binding | [`Error::AlreadyBound`], [`Error::BindingTornDown`] |
//! | Host endpoint | [`Error::RequestTimeout`], [`Error::TooManyPendingRequests`], [`Error::ReplyDropped`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::{ChannelName, RequestId};
use crate::value::Value;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// The first three variants map one-to-one onto command reply categories,
/// see [`CommandReply::from_error`](crate::protocol::CommandReply::from_error).
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// Required argument missing or of the wrong shape.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Method unknown, or valid only with a sub-feature that is not attached.
    #[error("Not implemented: {method}")]
    NotImplemented {
        /// The method name as received.
        method: String,
    },

    /// The embedded control reported a failure for a well-formed request.
    #[error("Operation failed: {message}")]
    OperationFailed {
        /// Message from the control.
        message: String,
        /// Optional structured detail payload.
        details: Option<Value>,
    },

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// No channel registered under this name.
    #[error("Channel not found: {name}")]
    ChannelNotFound {
        /// The missing channel name.
        name: ChannelName,
    },

    /// A channel with this name is already registered.
    #[error("Channel already registered: {name}")]
    DuplicateChannel {
        /// The conflicting channel name.
        name: ChannelName,
    },

    /// The channel was closed before the exchange completed.
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // Binding Errors
    // ========================================================================
    /// The binding already observes a target.
    #[error("Binding already bound")]
    AlreadyBound,

    /// The binding was torn down and cannot be bound again.
    #[error("Binding torn down")]
    BindingTornDown,

    // ========================================================================
    // Host Endpoint Errors
    // ========================================================================
    /// Command reply did not arrive in time.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Too many commands awaiting a reply.
    #[error("Too many pending requests: {pending}/{max}")]
    TooManyPendingRequests {
        /// Requests currently in flight.
        pending: usize,
        /// Configured limit.
        max: usize,
    },

    /// The reply sender was dropped before a reply arrived.
    #[error("Reply dropped")]
    ReplyDropped(#[from] RecvError),

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a missing argument error for `key`.
    #[inline]
    pub fn missing_argument(key: &str) -> Self {
        Self::invalid_argument(format!("missing required argument '{key}'"))
    }

    /// Creates a type mismatch error for `key`.
    #[inline]
    pub fn argument_type(key: &str, expected: &str) -> Self {
        Self::invalid_argument(format!("argument '{key}' must be {expected}"))
    }

    /// Creates a not implemented error.
    #[inline]
    pub fn not_implemented(method: impl Into<String>) -> Self {
        Self::NotImplemented {
            method: method.into(),
        }
    }

    /// Creates an operation failed error without details.
    #[inline]
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
            details: None,
        }
    }

    /// Creates an operation failed error carrying a detail payload.
    #[inline]
    pub fn operation_failed_with(message: impl Into<String>, details: impl Into<Value>) -> Self {
        Self::OperationFailed {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a channel not found error.
    #[inline]
    pub fn channel_not_found(name: ChannelName) -> Self {
        Self::ChannelNotFound { name }
    }

    /// Creates a duplicate channel error.
    #[inline]
    pub fn duplicate_channel(name: ChannelName) -> Self {
        Self::DuplicateChannel { name }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if the error is caused by malformed arguments.
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if the error is a channel error.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Self::ChannelNotFound { .. }
                | Self::DuplicateChannel { .. }
                | Self::ChannelClosed
                | Self::ReplyDropped(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout { .. } | Self::TooManyPendingRequests { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
