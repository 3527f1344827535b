//! Traffic envelopes exchanged with the transport.
//!
//! | Envelope | Direction | Purpose |
//! |----------|-----------|---------|
//! | [`Incoming::Command`] | Host → Web view | Invoke an operation |
//! | [`Incoming::EventReply`] | Host → Web view | Answer a reply-expecting event |
//! | [`Outbound::Reply`] | Web view → Host | Reply to a command |
//! | [`Outbound::Event`] | Web view → Host | Notification, `id` set if an answer is expected |

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::{ChannelName, RequestId};
use crate::value::Value;

use super::{CommandReply, Event};

// ============================================================================
// Incoming
// ============================================================================

/// Traffic arriving at a channel from its counterpart.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A command to dispatch.
    Command {
        /// Correlates the reply.
        id: RequestId,
        /// Wire method name.
        method: String,
        /// Raw arguments (map or null).
        arguments: Value,
    },

    /// The answer to an event sent with a request ID.
    EventReply {
        /// The event's request ID.
        id: RequestId,
        /// `None` when the counterpart declined to answer.
        result: Option<Value>,
    },
}

// ============================================================================
// Outbound
// ============================================================================

/// Traffic leaving a channel towards its counterpart.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Reply to the command with the same ID.
    Reply {
        /// The command's request ID.
        id: RequestId,
        /// The reply.
        reply: CommandReply,
    },

    /// An event.
    Event {
        /// Present when the sender waits for an [`Incoming::EventReply`].
        id: Option<RequestId>,
        /// The event.
        event: Event,
    },
}

// ============================================================================
// Envelope
// ============================================================================

/// Incoming traffic addressed to a channel by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Destination channel.
    pub channel: ChannelName,
    /// Message.
    pub message: Incoming,
}

impl Envelope {
    /// Creates an envelope.
    #[inline]
    #[must_use]
    pub fn new(channel: impl Into<ChannelName>, message: Incoming) -> Self {
        Self {
            channel: channel.into(),
            message,
        }
    }

    /// Creates a command envelope with a fresh request ID.
    #[must_use]
    pub fn command(
        channel: impl Into<ChannelName>,
        method: impl Into<String>,
        arguments: impl Into<Value>,
    ) -> Self {
        Self::new(
            channel,
            Incoming::Command {
                id: RequestId::generate(),
                method: method.into(),
                arguments: arguments.into(),
            },
        )
    }
}
