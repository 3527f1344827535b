//! Pending-reply callbacks for events that expect an answer.
//!
//! A [`ReplyCallback`] pairs a decode function with a completion target.
//! The channel registers it under the event's request ID before the event
//! is sent, and completes it with the counterpart's raw answer:
//!
//! | Raw answer | Meaning |
//! |------------|---------|
//! | `Some(value)` | Counterpart answered, possibly with `null` |
//! | `None` | Counterpart never answered (declined, channel closed, no counterpart) |
//!
//! Completion consumes the callback. A late or duplicate answer finds no
//! registration and is ignored by the channel.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::sync::oneshot;

use crate::value::Value;

// ============================================================================
// Types
// ============================================================================

type Decoder<T> = Box<dyn FnOnce(Option<Value>) -> T + Send>;
type Target<T> = Box<dyn FnOnce(T) + Send>;

/// Type-erased callback stored in a channel's pending map.
pub(crate) trait PendingReply: Send {
    /// Decodes `raw` and delivers it.
    fn complete(self: Box<Self>, raw: Option<Value>);
}

// ============================================================================
// ReplyCallback
// ============================================================================

/// An answer the counterpart owes, decoded into `T` on arrival.
pub struct ReplyCallback<T> {
    decode: Decoder<T>,
    target: Target<T>,
}

impl<T> fmt::Debug for ReplyCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyCallback").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> ReplyCallback<T> {
    /// Creates a callback that hands the decoded answer to `on_result`.
    #[must_use]
    pub fn new(
        decode: impl FnOnce(Option<Value>) -> T + Send + 'static,
        on_result: impl FnOnce(T) + Send + 'static,
    ) -> Self {
        Self {
            decode: Box::new(decode),
            target: Box::new(on_result),
        }
    }

    /// Creates a callback whose decoded answer arrives on a oneshot receiver.
    ///
    /// Dropping the receiver turns completion into a no-op.
    #[must_use]
    pub fn oneshot(
        decode: impl FnOnce(Option<Value>) -> T + Send + 'static,
    ) -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let callback = Self::new(decode, move |value| {
            let _ = tx.send(value);
        });
        (callback, rx)
    }

    /// Decodes `raw` and delivers the result, consuming the callback.
    pub fn complete(self, raw: Option<Value>) {
        let value = (self.decode)(raw);
        (self.target)(value);
    }
}

impl ReplyCallback<Option<Value>> {
    /// Creates a pass-through callback.
    ///
    /// The raw answer is delivered as is: `None` (no answer) stays distinct
    /// from `Some(Value::Null)` (explicit null).
    #[must_use]
    pub fn raw(on_result: impl FnOnce(Option<Value>) + Send + 'static) -> Self {
        Self::new(identity, on_result)
    }
}

impl<T: Send + 'static> PendingReply for ReplyCallback<T> {
    fn complete(self: Box<Self>, raw: Option<Value>) {
        ReplyCallback::complete(*self, raw);
    }
}

/// Pass-through decoder.
#[inline]
#[must_use]
pub fn identity(raw: Option<Value>) -> Option<Value> {
    raw
}

// ============================================================================
// Tests
// ============================================================================
