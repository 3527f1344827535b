//! Command replies.
//!
//! Every inbound command gets exactly one [`CommandReply`].
//!
//! | Reply | Meaning |
//! |-------|---------|
//! | `Success(value)` | Operation done; also sent for a torn-down target |
//! | `Failure { code, .. }` | [`INVALID_ARGUMENTS`] or [`OPERATION_FAILED`] |
//! | `NotImplemented` | Unknown method, or container method without container |

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::value::Value;

// ============================================================================
// Constants
// ============================================================================

/// Failure code for missing or malformed arguments.
pub const INVALID_ARGUMENTS: &str = "invalid_arguments";

/// Failure code for errors reported by the embedded control.
pub const OPERATION_FAILED: &str = "operation_failed";

// ============================================================================
// CommandReply
// ============================================================================

/// The single reply to a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    /// Operation succeeded.
    Success(Value),

    /// Operation failed.
    Failure {
        /// Machine-readable code the caller can branch on.
        code: String,
        /// Human readable message.
        message: String,
        /// Optional structured details.
        details: Option<Value>,
    },

    /// Method not available on this target.
    NotImplemented,
}

impl CommandReply {
    /// Creates a success reply.
    #[inline]
    #[must_use]
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    /// Creates a failure reply.
    #[inline]
    #[must_use]
    pub fn failure(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self::Failure {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Converts an error into the reply a caller should observe.
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        match error {
            Error::InvalidArgument { message } => Self::failure(INVALID_ARGUMENTS, message, None),
            Error::NotImplemented { .. } => Self::NotImplemented,
            Error::OperationFailed { message, details } => {
                Self::failure(OPERATION_FAILED, message, details)
            }
            other => Self::failure(OPERATION_FAILED, other.to_string(), None),
        }
    }

    /// Returns `true` for a success reply.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for a not-implemented reply.
    #[inline]
    #[must_use]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// Returns the failure code, if this is a failure.
    #[inline]
    #[must_use]
    pub fn failure_code(&self) -> Option<&str> {
        match self {
            Self::Failure { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Extracts the success value.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an `invalid_arguments` failure
    /// - [`Error::OperationFailed`] for any other failure
    /// - [`Error::NotImplemented`] naming `method`
    pub fn into_result(self, method: &str) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure { code, message, .. } if code == INVALID_ARGUMENTS => {
                Err(Error::invalid_argument(message))
            }
            Self::Failure {
                message, details, ..
            } => Err(Error::OperationFailed { message, details }),
            Self::NotImplemented => Err(Error::not_implemented(method)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
