//! One-shot reply handles for inbound commands.
//!
//! A [`ReplySink`] is created for every inbound command and carries its
//! single reply back over the channel, tagged with the command's request ID.
//! Sending consumes the sink, so a second reply cannot be expressed.
//!
//! A [`Completion`] is the typed continuation handed to the embedded
//! control for asynchronous operations. The control calls
//! [`Completion::complete`] or [`Completion::fail`] exactly once, from any
//! thread.
//!
//! Dropping either handle without replying sends `Success(null)`: a
//! completion discarded during teardown must not leave the caller hanging.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{CommandReply, Outbound};
use crate::value::Value;

use super::Channel;

// ============================================================================
// ReplySink
// ============================================================================

/// Move-only handle that sends the reply to one command.
pub struct ReplySink {
    /// Request being answered.
    id: RequestId,
    /// Channel the reply goes out on; `None` once used.
    channel: Option<Channel>,
}

impl fmt::Debug for ReplySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplySink")
            .field("id", &self.id)
            .field("replied", &self.channel.is_none())
            .finish()
    }
}

impl ReplySink {
    /// Creates a sink for request `id` on `channel`.
    pub(crate) fn new(id: RequestId, channel: Channel) -> Self {
        Self {
            id,
            channel: Some(channel),
        }
    }

    /// Returns the request ID this sink answers.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Sends `reply`, consuming the sink.
    pub fn send(mut self, reply: CommandReply) {
        self.deliver(reply);
    }

    /// Sends a success reply.
    #[inline]
    pub fn success(self, value: impl Into<Value>) {
        self.send(CommandReply::success(value));
    }

    /// Sends the reply matching `error`.
    #[inline]
    pub fn error(self, error: Error) {
        self.send(CommandReply::from_error(error));
    }

    /// Sends a not-implemented reply.
    #[inline]
    pub fn not_implemented(self) {
        self.send(CommandReply::NotImplemented);
    }

    fn deliver(&mut self, reply: CommandReply) {
        if let Some(channel) = self.channel.take() {
            trace!(request_id = %self.id, channel = %channel.name(), "Sending reply");
            channel.send_outbound(Outbound::Reply { id: self.id, reply });
        }
    }
}

impl Drop for ReplySink {
    fn drop(&mut self) {
        if self.channel.is_some() {
            debug!(request_id = %self.id, "Reply sink dropped without reply");
            self.deliver(CommandReply::Success(Value::Null));
        }
    }
}

// ============================================================================
// Completion
// ============================================================================

type Continuation<T> = Box<dyn FnOnce(Result<T>) + Send>;

/// Typed continuation for an asynchronous control operation.
pub struct Completion<T> {
    continuation: Continuation<T>,
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

impl<T: 'static> Completion<T> {
    /// Creates a completion running `continuation` with the outcome.
    #[must_use]
    pub fn new(continuation: impl FnOnce(Result<T>) + Send + 'static) -> Self {
        Self {
            continuation: Box::new(continuation),
        }
    }

    /// Creates a completion that replies through `sink` after `encode`.
    #[must_use]
    pub fn reply_with(sink: ReplySink, encode: impl FnOnce(T) -> Value + Send + 'static) -> Self {
        Self::new(move |result| match result {
            Ok(value) => sink.success(encode(value)),
            Err(e) => sink.error(e),
        })
    }

    /// Completes with a value.
    pub fn complete(self, value: T) {
        (self.continuation)(Ok(value));
    }

    /// Completes with a failure reported by the control.
    pub fn fail(self, error: Error) {
        (self.continuation)(Err(error));
    }

    /// Completes with either outcome.
    pub fn resolve(self, result: Result<T>) {
        (self.continuation)(result);
    }
}

impl<T: Into<Value> + 'static> Completion<T> {
    /// Creates a completion that replies through `sink` directly.
    #[must_use]
    pub fn reply(sink: ReplySink) -> Self {
        Self::reply_with(sink, Into::into)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::mpsc;

    use crate::identifiers::ChannelName;

    fn channel_with_counterpart() -> (Channel, mpsc::UnboundedReceiver<Outbound>) {
        let channel = Channel::new(ChannelName::new("reply-test"), 8);
        let (tx, rx) = mpsc::unbounded_channel();
        channel.attach_counterpart(tx);
        (channel, rx)
    }

    fn expect_reply(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> (RequestId, CommandReply) {
        match rx.try_recv().expect("reply sent") {
            Outbound::Reply { id, reply } => (id, reply),
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_sink_sends_once_with_its_id() {
        let (channel, mut rx) = channel_with_counterpart();
        let id = RequestId::generate();

        ReplySink::new(id, channel).success(true);

        assert_eq!(expect_reply(&mut rx), (id, CommandReply::success(true)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_sink_replies_null() {
        let (channel, mut rx) = channel_with_counterpart();
        let id = RequestId::generate();

        drop(ReplySink::new(id, channel));

        assert_eq!(expect_reply(&mut rx), (id, CommandReply::Success(Value::Null)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_completion_reply_encodes_value() {
        let (channel, mut rx) = channel_with_counterpart();
        let id = RequestId::generate();

        let completion: Completion<String> = Completion::reply(ReplySink::new(id, channel));
        completion.complete("2".to_string());

        assert_eq!(expect_reply(&mut rx).1, CommandReply::success("2"));
    }

    #[test]
    fn test_completion_fail_maps_error() {
        let (channel, mut rx) = channel_with_counterpart();
        let completion: Completion<bool> =
            Completion::reply(ReplySink::new(RequestId::generate(), channel));

        completion.fail(Error::operation_failed("engine gone"));

        let (_, reply) = expect_reply(&mut rx);
        assert_eq!(reply.failure_code(), Some(crate::protocol::OPERATION_FAILED));
    }

    #[test]
    fn test_discarded_completion_replies_null() {
        let (channel, mut rx) = channel_with_counterpart();
        let completion: Completion<bool> =
            Completion::reply(ReplySink::new(RequestId::generate(), channel));

        drop(completion);

        assert_eq!(expect_reply(&mut rx).1, CommandReply::Success(Value::Null));
    }

    #[test]
    fn test_completion_runs_continuation_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let completion = Completion::new(move |result: Result<i64>| {
            assert_eq!(result.expect("ok"), 5);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        completion.complete(5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
