//! In-process host endpoint and event loop.
//!
//! A [`HostEndpoint`] is the counterpart side of a [`Channel`]: it issues
//! commands, awaits their replies, and receives events.
//!
//! # Event Loop
//!
//! The endpoint spawns a tokio task that handles:
//!
//! - Replies from the web view, matched to waiting callers by request ID
//! - Events, passed to the event handler
//! - Answers to reply-expecting events, sent back on the channel

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::options::BridgeOptions;
use crate::protocol::{CommandReply, Event, Outbound};
use crate::value::Value;

use super::Channel;
use super::channel::CounterpartId;

// ============================================================================
// Types
// ============================================================================

/// Map of request IDs to reply channels.
type CorrelationMap = FxHashMap<RequestId, oneshot::Sender<CommandReply>>;

/// Event handler callback type.
///
/// Called for each event from the web view. For reply-expecting events the
/// return value is the answer; `None` means "no answer".
pub type EventHandler = Arc<dyn Fn(&Event) -> Option<Value> + Send + Sync>;

// ============================================================================
// HostEndpoint
// ============================================================================

/// Host side of a channel.
///
/// Dropping the endpoint detaches it from the channel; waiting callers then
/// fail with [`Error::ChannelClosed`].
pub struct HostEndpoint {
    /// Channel this endpoint is attached to.
    channel: Channel,
    /// Attachment token.
    counterpart: CounterpartId,
    /// Callers awaiting replies (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
    /// Event handler (shared with event loop).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
    /// Default reply timeout.
    command_timeout: Duration,
    /// Maximum in-flight commands.
    max_pending: usize,
    /// Event loop task.
    task: JoinHandle<()>,
}

impl HostEndpoint {
    /// Attaches a new endpoint to `channel`.
    ///
    /// Spawns the event loop task; must be called within a tokio runtime.
    #[must_use]
    pub fn connect(channel: &Channel, options: &BridgeOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));
        let event_handler: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));

        let counterpart = channel.attach_counterpart(tx);

        let task = tokio::spawn(Self::run_event_loop(
            rx,
            channel.clone(),
            Arc::clone(&correlation),
            Arc::clone(&event_handler),
        ));

        debug!(channel = %channel.name(), "Host endpoint connected");

        Self {
            channel: channel.clone(),
            counterpart,
            correlation,
            event_handler,
            command_timeout: options.command_timeout,
            max_pending: options.max_pending_replies,
            task,
        }
    }

    /// Returns the channel.
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Sets the event handler callback.
    pub fn set_event_handler(&self, handler: EventHandler) {
        *self.event_handler.lock() = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        *self.event_handler.lock() = None;
    }

    /// Returns the number of commands awaiting a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Invokes a method and returns its success value.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] / [`Error::OperationFailed`] for failure replies
    /// - [`Error::NotImplemented`] for not-implemented replies
    /// - everything [`HostEndpoint::invoke`] returns
    pub async fn call(&self, method: &str, arguments: impl Into<Value>) -> Result<Value> {
        self.invoke(method, arguments).await?.into_result(method)
    }

    /// Invokes a method and returns the raw reply, using the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyPendingRequests`] if too many commands are in flight
    /// - [`Error::RequestTimeout`] if no reply arrives in time
    /// - [`Error::ChannelClosed`] if the endpoint shut down while waiting
    pub async fn invoke(&self, method: &str, arguments: impl Into<Value>) -> Result<CommandReply> {
        self.invoke_with_timeout(method, arguments, self.command_timeout)
            .await
    }

    /// Invokes a method with a custom timeout.
    ///
    /// # Errors
    ///
    /// See [`HostEndpoint::invoke`].
    pub async fn invoke_with_timeout(
        &self,
        method: &str,
        arguments: impl Into<Value>,
        request_timeout: Duration,
    ) -> Result<CommandReply> {
        let request_id = RequestId::generate();
        let (reply_tx, reply_rx) = oneshot::channel();

        // Check limit and register before dispatching
        {
            let mut correlation = self.correlation.lock();
            if correlation.len() >= self.max_pending {
                warn!(
                    pending = correlation.len(),
                    max = self.max_pending,
                    "Too many pending requests"
                );
                return Err(Error::TooManyPendingRequests {
                    pending: correlation.len(),
                    max: self.max_pending,
                });
            }
            correlation.insert(request_id, reply_tx);
        }
        let _registration = Registration {
            correlation: &self.correlation,
            id: request_id,
        };

        trace!(request_id = %request_id, method = %method, "Invoking");
        self.channel
            .handle_command(request_id, method.to_string(), arguments.into());

        match timeout(request_timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(Error::ChannelClosed),
            Err(_) => Err(Error::request_timeout(
                request_id,
                timeout_millis(request_timeout),
            )),
        }
    }

    /// Detaches from the channel and fails waiting callers.
    ///
    /// This is called automatically on drop.
    pub fn shutdown(&self) {
        self.channel.detach_counterpart(self.counterpart);
        Self::fail_pending_requests(&self.correlation);
    }

    /// Event loop that handles outbound traffic from the web view.
    async fn run_event_loop(
        mut rx: mpsc::UnboundedReceiver<Outbound>,
        channel: Channel,
        correlation: Arc<Mutex<CorrelationMap>>,
        event_handler: Arc<Mutex<Option<EventHandler>>>,
    ) {
        while let Some(message) = rx.recv().await {
            match message {
                Outbound::Reply { id, reply } => {
                    let tx = correlation.lock().remove(&id);
                    match tx {
                        Some(tx) => {
                            let _ = tx.send(reply);
                        }
                        None => warn!(request_id = %id, "Reply for unknown request"),
                    }
                }

                Outbound::Event { id, event } => {
                    // Clone out so the handler runs without the lock held
                    let handler = event_handler.lock().clone();
                    let answer = handler.and_then(|handler| handler(&event));

                    if let Some(id) = id {
                        channel.handle_event_reply(id, answer);
                    }
                }
            }
        }

        Self::fail_pending_requests(&correlation);

        debug!(channel = %channel.name(), "Event loop terminated");
    }

    /// Drops all waiting reply senders so their callers see a closed channel.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();
        drop(pending);

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn timeout_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Removes a correlation entry when its caller finishes or is dropped.
struct Registration<'a> {
    correlation: &'a Mutex<CorrelationMap>,
    id: RequestId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.correlation.lock().remove(&self.id);
    }
}

impl Drop for HostEndpoint {
    fn drop(&mut self) {
        self.shutdown();
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::identifiers::ChannelName;
    use crate::protocol::CommandRequest;
    use crate::transport::{CommandHandler, ReplySink, ReplyCallback};
    use crate::transport::callback::identity;
    use crate::value::Map;

    /// Replies with the method name; never replies to "hang".
    struct Named {
        parked: Mutex<Vec<ReplySink>>,
    }

    impl CommandHandler for Named {
        fn handle(&self, request: CommandRequest, reply: ReplySink) {
            if request.method == "hang" {
                self.parked.lock().push(reply);
            } else {
                reply.success(request.method);
            }
        }
    }

    fn setup(options: &BridgeOptions) -> (Channel, HostEndpoint) {
        let channel = Channel::new(ChannelName::new("host-test"), 8);
        channel.set_handler(Arc::new(Named {
            parked: Mutex::new(Vec::new()),
        }));
        let endpoint = HostEndpoint::connect(&channel, options);
        (channel, endpoint)
    }

    #[tokio::test]
    async fn test_call_returns_reply_value() {
        let (_channel, endpoint) = setup(&BridgeOptions::default());

        let value = endpoint.call("getUrl", Value::Null).await.expect("reply");
        assert_eq!(value, Value::from("getUrl"));
        assert_eq!(endpoint.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_invoke_times_out_and_cleans_up() {
        let (_channel, endpoint) = setup(&BridgeOptions::default());

        let err = endpoint
            .invoke_with_timeout("hang", Value::Null, Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(endpoint.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_invoke_releases_its_slot() {
        let options = BridgeOptions::new().with_max_pending_replies(1);
        let (_channel, endpoint) = setup(&options);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            endpoint.invoke_with_timeout("hang", Value::Null, Duration::from_secs(60)),
        )
        .await;

        assert!(abandoned.is_err());
        assert_eq!(endpoint.pending_count(), 0);
        assert_eq!(
            endpoint.call("getUrl", Value::Null).await.expect("slot free"),
            Value::from("getUrl")
        );
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_pending_limit() {
        let options = BridgeOptions::new().with_max_pending_replies(1);
        let (_channel, endpoint) = setup(&options);

        let (first, second) = tokio::join!(
            endpoint.invoke_with_timeout("hang", Value::Null, Duration::from_millis(50)),
            endpoint.invoke_with_timeout("getUrl", Value::Null, Duration::from_millis(50)),
        );

        assert!(first.unwrap_err().is_timeout());
        assert!(matches!(
            second.unwrap_err(),
            Error::TooManyPendingRequests { .. }
        ));
    }

    #[tokio::test]
    async fn test_event_handler_answers_events() {
        let (channel, endpoint) = setup(&BridgeOptions::default());
        endpoint.set_event_handler(Arc::new(|event: &Event| {
            Some(Value::from(format!("handled {}", event.name)))
        }));

        let (callback, answer) = ReplyCallback::oneshot(identity);
        channel.send_with_reply(Event::new("onCallJsHandler", Map::new()), callback);

        assert_eq!(
            answer.await.expect("answered"),
            Some(Value::from("handled onCallJsHandler"))
        );
    }

    #[tokio::test]
    async fn test_missing_handler_answers_absent() {
        let (channel, _endpoint) = setup(&BridgeOptions::default());

        let (callback, answer) = ReplyCallback::oneshot(identity);
        channel.send_with_reply(Event::new("onCallJsHandler", Map::new()), callback);

        assert_eq!(answer.await.expect("answered"), None);
    }

    #[tokio::test]
    async fn test_drop_detaches() {
        let (channel, endpoint) = setup(&BridgeOptions::default());
        assert!(channel.has_counterpart());

        drop(endpoint);
        assert!(!channel.has_counterpart());
    }
}
