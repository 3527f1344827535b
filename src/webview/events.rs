//! Outbound web view events.
//!
//! The control reports state changes through an [`EventEmitter`]; each call
//! builds the payload and sends it on the bridge's channel. Events that need
//! a host decision carry a [`ReplyCallback`].
//!
//! Without a counterpart, events are dropped and callbacks complete with
//! "no answer".

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::protocol::{Event, EventName};
use crate::transport::{Channel, ReplyCallback};
use crate::value::{Map, Value};

use super::binding::Binding;
use super::control::WebView;
use super::types::{
    ConsoleMessageLevel, NavigationAction, NavigationActionPolicy, WebResourceError,
    WebResourceRequest, WebResourceResponse,
};

// ============================================================================
// Callback Constructors
// ============================================================================

impl ReplyCallback<NavigationActionPolicy> {
    /// Callback for `shouldOverrideUrlLoading`.
    ///
    /// A missing, null, or malformed answer decodes to
    /// [`NavigationActionPolicy::Cancel`].
    #[must_use]
    pub fn navigation_policy(
        on_result: impl FnOnce(NavigationActionPolicy) + Send + 'static,
    ) -> Self {
        Self::new(NavigationActionPolicy::decode, on_result)
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Sends web view events over a channel.
///
/// Cheap to clone; the control may keep one and emit from any thread.
#[derive(Clone)]
pub struct EventEmitter {
    channel: Channel,
    binding: Arc<Binding<dyn WebView>>,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("channel", self.channel.name())
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter for `channel`.
    #[must_use]
    pub fn new(channel: Channel, binding: Arc<Binding<dyn WebView>>) -> Self {
        Self { channel, binding }
    }

    /// Sends an arbitrary event.
    pub fn emit(&self, name: &str, payload: Map) {
        trace!(channel = %self.channel.name(), event = %name, "Emitting event");
        self.channel.send(Event::new(name, payload));
    }

    /// Sends an arbitrary event that expects an answer.
    pub fn emit_with_reply<T: Send + 'static>(
        &self,
        name: &str,
        payload: Map,
        callback: ReplyCallback<T>,
    ) {
        trace!(channel = %self.channel.name(), event = %name, "Emitting event with reply");
        self.channel
            .send_with_reply(Event::new(name, payload), callback);
    }
}

// ============================================================================
// EventEmitter - Web View Events
// ============================================================================

impl EventEmitter {
    pub fn on_load_start(&self, url: Option<&str>) {
        self.emit(EventName::LoadStart.as_str(), payload([("url", url.into())]));
    }

    pub fn on_load_stop(&self, url: Option<&str>) {
        self.emit(EventName::LoadStop.as_str(), payload([("url", url.into())]));
    }

    /// Asks the host whether to allow `action`.
    pub fn should_override_url_loading(
        &self,
        action: &NavigationAction,
        callback: ReplyCallback<NavigationActionPolicy>,
    ) {
        self.emit_with_reply(
            EventName::ShouldOverrideUrlLoading.as_str(),
            action.to_map(),
            callback,
        );
    }

    pub fn on_received_error(&self, request: &WebResourceRequest, error: &WebResourceError) {
        self.emit(
            EventName::ReceivedError.as_str(),
            payload([
                ("request", request.to_map().into()),
                ("error", error.to_map().into()),
            ]),
        );
    }

    pub fn on_received_http_error(
        &self,
        request: &WebResourceRequest,
        error_response: &WebResourceResponse,
    ) {
        self.emit(
            EventName::ReceivedHttpError.as_str(),
            payload([
                ("request", request.to_map().into()),
                ("errorResponse", error_response.to_map().into()),
            ]),
        );
    }

    /// Reports a title change.
    ///
    /// The container, if any, is told as well, even when the event itself
    /// has nobody to go to.
    pub fn on_title_changed(&self, title: Option<&str>) {
        self.emit(EventName::TitleChanged.as_str(), payload([("title", title.into())]));

        let container = self.binding.target().and_then(|target| target.container());
        if let Some(container) = container {
            container.did_change_title(title);
        }
    }

    pub fn on_update_visited_history(&self, url: Option<&str>, is_reload: Option<bool>) {
        self.emit(
            EventName::UpdateVisitedHistory.as_str(),
            payload([("url", url.into()), ("isReload", is_reload.into())]),
        );
    }

    /// Forwards a page-side handler call; `args` is the JSON-encoded list.
    ///
    /// The host's answer arrives untouched: `None` when it never answered,
    /// `Some(Value::Null)` for an explicit null.
    pub fn on_call_js_handler(
        &self,
        handler_name: &str,
        args: &str,
        callback: ReplyCallback<Option<Value>>,
    ) {
        self.emit_with_reply(
            EventName::CallJsHandler.as_str(),
            payload([("handlerName", handler_name.into()), ("args", args.into())]),
            callback,
        );
    }

    pub fn on_console_message(&self, message: &str, level: ConsoleMessageLevel) {
        self.emit(
            EventName::ConsoleMessage.as_str(),
            payload([
                ("message", message.into()),
                ("messageLevel", Value::Int(level as i64)),
            ]),
        );
    }
}

fn payload<const N: usize>(entries: [(&str, Value); N]) -> Map {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
