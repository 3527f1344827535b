//! Named bidirectional channel.
//!
//! A [`Channel`] sits between a transport counterpart (the host side) and a
//! [`CommandHandler`] (the web view side).
//!
//! # Traffic
//!
//! - Inbound commands go to the handler with a [`ReplySink`]. Without a
//!   handler (target destroyed) the command is answered `Success(null)`.
//! - Outbound replies and events go to the counterpart. Without a
//!   counterpart they are dropped.
//! - Reply-expecting events register their [`ReplyCallback`] under a fresh
//!   request ID *before* sending, so an answer delivered on the same turn
//!   always finds its registration.
//!
//! # Thread Safety
//!
//! `Channel` is `Send + Sync` and cheap to clone. No lock is held while
//! calling the handler or a callback, so completions may re-enter the send
//! path from any thread.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::identifiers::{ChannelName, RequestId};
use crate::protocol::{CommandRequest, Event, Incoming, Outbound};
use crate::value::Value;

use super::callback::{PendingReply, ReplyCallback};
use super::reply::ReplySink;

// ============================================================================
// Types
// ============================================================================

/// Map of event request IDs to their callbacks.
type PendingMap = FxHashMap<RequestId, Box<dyn PendingReply>>;

/// Handles inbound commands for one channel.
///
/// Implementations must consume `reply` exactly once, either before
/// returning or later from a completion.
pub trait CommandHandler: Send + Sync {
    /// Handles one command.
    fn handle(&self, request: CommandRequest, reply: ReplySink);
}

/// Token returned by [`Channel::attach_counterpart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterpartId(u64);

/// Currently attached counterpart.
struct Counterpart {
    id: CounterpartId,
    tx: mpsc::UnboundedSender<Outbound>,
}

/// Internal shared state for a channel.
struct ChannelInner {
    /// Channel name.
    name: ChannelName,
    /// Cap on outstanding reply-expecting events.
    max_pending: usize,
    /// Host side of the channel, if attached.
    counterpart: RwLock<Option<Counterpart>>,
    /// Web view side of the channel, if bound.
    handler: RwLock<Option<Arc<dyn CommandHandler>>>,
    /// Callbacks awaiting event answers.
    pending: Mutex<PendingMap>,
    /// Set once by `close`.
    closed: AtomicBool,
    /// Source of counterpart tokens.
    next_counterpart: AtomicU64,
}

// ============================================================================
// Channel
// ============================================================================

/// A named conduit carrying structured values between host and web view.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.inner.name)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl Channel {
    /// Creates an unattached channel.
    ///
    /// `max_pending` caps outstanding reply-expecting events.
    #[must_use]
    pub fn new(name: ChannelName, max_pending: usize) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                name,
                max_pending: max_pending.max(1),
                counterpart: RwLock::new(None),
                handler: RwLock::new(None),
                pending: Mutex::new(PendingMap::default()),
                closed: AtomicBool::new(false),
                next_counterpart: AtomicU64::new(1),
            }),
        }
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &ChannelName {
        &self.inner.name
    }

    /// Returns `true` once the channel was closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Returns the number of events awaiting an answer.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }
}

// ============================================================================
// Channel - Attachment
// ============================================================================

impl Channel {
    /// Attaches the host side, replacing any previous counterpart.
    pub fn attach_counterpart(&self, tx: mpsc::UnboundedSender<Outbound>) -> CounterpartId {
        let id = CounterpartId(self.inner.next_counterpart.fetch_add(1, Ordering::Relaxed));
        let previous = self.inner.counterpart.write().replace(Counterpart { id, tx });

        if previous.is_some() {
            debug!(channel = %self.inner.name, "Counterpart replaced");
        } else {
            debug!(channel = %self.inner.name, "Counterpart attached");
        }

        id
    }

    /// Detaches the counterpart if it is still the one identified by `id`.
    ///
    /// Returns `true` if it was detached.
    pub fn detach_counterpart(&self, id: CounterpartId) -> bool {
        let mut counterpart = self.inner.counterpart.write();
        if counterpart.as_ref().is_some_and(|c| c.id == id) {
            *counterpart = None;
            debug!(channel = %self.inner.name, "Counterpart detached");
            true
        } else {
            false
        }
    }

    /// Returns `true` if a live counterpart is attached.
    #[must_use]
    pub fn has_counterpart(&self) -> bool {
        self.inner
            .counterpart
            .read()
            .as_ref()
            .is_some_and(|c| !c.tx.is_closed())
    }

    /// Installs the command handler.
    ///
    /// Ignored on a closed channel.
    pub fn set_handler(&self, handler: Arc<dyn CommandHandler>) {
        if self.is_closed() {
            warn!(channel = %self.inner.name, "Handler set on closed channel ignored");
            return;
        }
        *self.inner.handler.write() = Some(handler);
    }

    /// Removes the command handler.
    pub fn clear_handler(&self) {
        *self.inner.handler.write() = None;
    }

    /// Closes the channel permanently.
    ///
    /// The handler is removed and every pending event callback is completed
    /// with "no answer". The counterpart stays attached so that later
    /// commands still receive their `Success(null)` reply.
    pub fn close(&self) {
        let pending: Vec<_> = {
            let mut pending = self.inner.pending.lock();
            {
                // Emitters check the flag under these locks
                let _counterpart = self.inner.counterpart.write();
                if self.inner.closed.swap(true, Ordering::AcqRel) {
                    return;
                }
            }
            pending.drain().collect()
        };

        self.clear_handler();

        let count = pending.len();
        for (_, callback) in pending {
            callback.complete(None);
        }

        debug!(channel = %self.inner.name, abandoned = count, "Channel closed");
    }
}

// ============================================================================
// Channel - Inbound
// ============================================================================

impl Channel {
    /// Delivers one inbound message.
    pub fn handle(&self, message: Incoming) {
        match message {
            Incoming::Command {
                id,
                method,
                arguments,
            } => self.handle_command(id, method, arguments),
            Incoming::EventReply { id, result } => self.handle_event_reply(id, result),
        }
    }

    /// Dispatches a command to the handler.
    ///
    /// Exactly one reply is sent for `id`.
    pub fn handle_command(&self, id: RequestId, method: String, arguments: Value) {
        let sink = ReplySink::new(id, self.clone());

        // Clone out so the handler runs without the lock held
        let handler = self.inner.handler.read().clone();
        let Some(handler) = handler else {
            trace!(channel = %self.inner.name, method = %method, "No handler bound, replying null");
            sink.success(Value::Null);
            return;
        };

        match CommandRequest::from_value(method, arguments) {
            Ok(request) => handler.handle(request, sink),
            Err(e) => {
                debug!(channel = %self.inner.name, error = %e, "Rejected command arguments");
                sink.error(e);
            }
        }
    }

    /// Completes the callback registered for event `id`.
    ///
    /// Unknown IDs (duplicate or late answers) are ignored.
    pub fn handle_event_reply(&self, id: RequestId, result: Option<Value>) {
        let callback = self.inner.pending.lock().remove(&id);

        match callback {
            Some(callback) => {
                trace!(channel = %self.inner.name, request_id = %id, "Event answered");
                callback.complete(result);
            }
            None => {
                warn!(channel = %self.inner.name, request_id = %id, "Answer for unknown event ignored");
            }
        }
    }
}

// ============================================================================
// Channel - Outbound
// ============================================================================

impl Channel {
    /// Sends an event without expecting an answer.
    ///
    /// Dropped silently on a closed channel or without counterpart.
    pub fn send(&self, event: Event) {
        let name = event.name.clone();
        if !self.send_event(Outbound::Event { id: None, event }) {
            trace!(channel = %self.inner.name, event = %name, "Closed or no counterpart, event dropped");
        }
    }

    /// Sends an event and registers `callback` for its answer.
    ///
    /// Without a counterpart, on a closed channel, or when too many answers
    /// are outstanding, the event is not sent and `callback` is completed
    /// with "no answer".
    pub fn send_with_reply<T: Send + 'static>(&self, event: Event, callback: ReplyCallback<T>) {
        let id = RequestId::generate();

        let rejected: Option<Box<dyn PendingReply>> = {
            let mut pending = self.inner.pending.lock();

            if self.is_closed() || !self.has_counterpart() {
                trace!(channel = %self.inner.name, event = %event.name, "No counterpart, answering absent");
                Some(Box::new(callback))
            } else if pending.len() >= self.inner.max_pending {
                warn!(
                    channel = %self.inner.name,
                    pending = pending.len(),
                    max = self.inner.max_pending,
                    "Too many pending event replies"
                );
                Some(Box::new(callback))
            } else {
                pending.insert(id, Box::new(callback));
                if self.send_event(Outbound::Event {
                    id: Some(id),
                    event,
                }) {
                    None
                } else {
                    // Counterpart went away between the check and the send
                    pending.remove(&id)
                }
            }
        };

        if let Some(callback) = rejected {
            callback.complete(None);
        }
    }

    /// Pushes an event to the counterpart unless the channel is closed.
    ///
    /// The flag is read under the counterpart lock, which `close` holds
    /// while setting it.
    fn send_event(&self, message: Outbound) -> bool {
        let counterpart = self.inner.counterpart.read();
        if self.is_closed() {
            return false;
        }
        match counterpart.as_ref() {
            Some(c) => c.tx.send(message).is_ok(),
            None => false,
        }
    }

    /// Pushes a message to the counterpart.
    ///
    /// Returns `false` if there is no live counterpart.
    pub(crate) fn send_outbound(&self, message: Outbound) -> bool {
        let counterpart = self.inner.counterpart.read();
        match counterpart.as_ref() {
            Some(c) => c.tx.send(message).is_ok(),
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
