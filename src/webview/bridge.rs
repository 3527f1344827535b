//! Web view bridge: one channel bound to one web view.
//!
//! Creating a [`WebViewBridge`] registers its channel and installs the
//! dispatcher; dropping it tears everything down.
//!
//! # Example
//!
//! ```ignore
//! let registry = ChannelRegistry::new();
//! let bridge = WebViewBridge::new(&registry, &WebViewId::from(1), &webview)?;
//!
//! bridge.events().on_load_start(Some("https://example.com"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::identifiers::{ChannelName, WebViewId};
use crate::transport::{Channel, ChannelRegistry};

use super::binding::{Binding, BindingState};
use super::control::WebView;
use super::dispatch::WebViewDispatcher;
use super::events::EventEmitter;

// ============================================================================
// WebViewBridge
// ============================================================================

/// Binding lifecycle owner for one web view.
///
/// Holds the web view weakly; dropping the web view leaves the bridge in
/// place but every command is answered `Success(null)`.
pub struct WebViewBridge {
    registry: Arc<ChannelRegistry>,
    channel: Channel,
    binding: Arc<Binding<dyn WebView>>,
    events: EventEmitter,
}

impl fmt::Debug for WebViewBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebViewBridge")
            .field("channel", self.channel.name())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl WebViewBridge {
    /// Binds `webview` on the conventional channel name for `id`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateChannel`](crate::Error::DuplicateChannel) if the
    /// name is taken.
    pub fn new(
        registry: &Arc<ChannelRegistry>,
        id: &WebViewId,
        webview: &Arc<dyn WebView>,
    ) -> Result<Self> {
        Self::with_name(registry, registry.channel_name(id), webview)
    }

    /// Binds `webview` on an explicit channel name.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateChannel`](crate::Error::DuplicateChannel) if the
    /// name is taken.
    pub fn with_name(
        registry: &Arc<ChannelRegistry>,
        name: ChannelName,
        webview: &Arc<dyn WebView>,
    ) -> Result<Self> {
        let channel = registry.open(name.clone())?;
        let binding = Arc::new(Binding::bound(webview));

        channel.set_handler(Arc::new(WebViewDispatcher::new(
            name.clone(),
            Arc::clone(&binding),
        )));

        info!(channel = %name, "Web view bound");

        Ok(Self {
            registry: Arc::clone(registry),
            events: EventEmitter::new(channel.clone(), Arc::clone(&binding)),
            channel,
            binding,
        })
    }

    /// Returns the channel.
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Returns the channel name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &ChannelName {
        self.channel.name()
    }

    /// Returns the event emitter.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Returns the binding state.
    #[must_use]
    pub fn state(&self) -> BindingState {
        self.binding.state()
    }

    /// Tears the binding down.
    ///
    /// Clears the target, closes the channel (pending event callbacks
    /// complete with "no answer"), and removes it from the registry.
    /// Idempotent; also runs on drop.
    pub fn tear_down(&self) {
        if !self.binding.tear_down() {
            return;
        }

        self.channel.close();
        self.registry.remove(self.channel.name().as_str());

        debug!(channel = %self.channel.name(), "Web view bridge torn down");
    }
}

impl Drop for WebViewBridge {
    fn drop(&mut self) {
        self.tear_down();
    }
}
