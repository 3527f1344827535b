//! Registry of named channels.
//!
//! Channels are addressed by [`ChannelName`]. The registry is an explicit
//! object handed to whatever constructs bindings; there is no process-wide
//! lookup. A binding inserts its channel when it is created and removes it
//! when it is torn down.
//!
//! A removed channel whose counterpart is still attached stays routable as a
//! retired entry: envelopes still reach it and commands are answered
//! `Success(null)`. It is dropped once the counterpart detaches, its name is
//! reopened, or the registry shuts down.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               ChannelRegistry                │
//! │  ┌────────────────────────────────────────┐  │
//! │  │ "…_webview_1" → Channel → WebView 1    │  │
//! │  │ "…_webview_2" → Channel → WebView 2    │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//!        ▲ Envelope { channel, message }
//!        │
//!    transport
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::identifiers::{ChannelName, WebViewId};
use crate::options::BridgeOptions;
use crate::protocol::Envelope;

use super::Channel;

// ============================================================================
// ChannelRegistry
// ============================================================================

/// Explicit name → channel map.
///
/// Thread-safe; share it behind the returned `Arc`.
pub struct ChannelRegistry {
    /// Configuration applied to every channel.
    options: BridgeOptions,

    /// Open channels by name.
    channels: RwLock<FxHashMap<ChannelName, Channel>>,

    /// Closed channels still reachable by their counterpart.
    retired: RwLock<FxHashMap<ChannelName, Channel>>,
}

// ============================================================================
// ChannelRegistry - Constructor
// ============================================================================

impl ChannelRegistry {
    /// Creates an empty registry with default options.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_options(BridgeOptions::default())
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_options(options: BridgeOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            channels: RwLock::new(FxHashMap::default()),
            retired: RwLock::new(FxHashMap::default()),
        })
    }
}

// ============================================================================
// ChannelRegistry - Public API
// ============================================================================

impl ChannelRegistry {
    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Returns the conventional channel name for a web view.
    #[inline]
    #[must_use]
    pub fn channel_name(&self, id: &WebViewId) -> ChannelName {
        ChannelName::with_prefix(&self.options.channel_prefix, id)
    }

    /// Creates and registers a channel.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateChannel`] if the name is taken.
    pub fn open(&self, name: ChannelName) -> Result<Channel> {
        let mut channels = self.channels.write();
        if channels.contains_key(&name) {
            return Err(Error::duplicate_channel(name));
        }

        let channel = Channel::new(name.clone(), self.options.max_pending_replies);
        channels.insert(name.clone(), channel.clone());
        self.retired.write().remove(&name);

        debug!(channel = %name, "Channel registered");
        Ok(channel)
    }

    /// Returns the channel registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Channel> {
        self.channels.read().get(name).cloned()
    }

    /// Returns the number of registered channels.
    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Returns all registered names.
    #[must_use]
    pub fn names(&self) -> Vec<ChannelName> {
        self.channels.read().keys().cloned().collect()
    }

    /// Returns the number of retired channels still routable.
    #[inline]
    #[must_use]
    pub fn retired_count(&self) -> usize {
        self.prune_retired();
        self.retired.read().len()
    }

    /// Routes an envelope to its channel.
    ///
    /// Envelopes for a retired channel reach the closed channel, so commands
    /// are answered `Success(null)`.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelNotFound`] if no open or retired channel has that name.
    pub fn deliver(&self, envelope: Envelope) -> Result<()> {
        let name = envelope.channel.as_str();
        let channel = match self.get(name) {
            Some(channel) => channel,
            None => self
                .retired_channel(name)
                .ok_or_else(|| Error::channel_not_found(envelope.channel.clone()))?,
        };

        channel.handle(envelope.message);
        Ok(())
    }

    /// Returns the retired channel for `name` while its counterpart lives.
    fn retired_channel(&self, name: &str) -> Option<Channel> {
        let channel = self.retired.read().get(name).cloned()?;
        if channel.has_counterpart() {
            return Some(channel);
        }

        self.retired.write().remove(name);
        debug!(channel = %name, "Retired channel dropped, counterpart gone");
        None
    }

    /// Drops retired channels whose counterpart has gone.
    fn prune_retired(&self) {
        self.retired.write().retain(|_, channel| channel.has_counterpart());
    }
}

// ============================================================================
// ChannelRegistry - Lifecycle
// ============================================================================

impl ChannelRegistry {
    /// Unregisters and closes a channel.
    ///
    /// If a counterpart is still attached the channel is kept as a retired
    /// entry so routed commands keep getting answered.
    pub fn remove(&self, name: &str) -> Option<Channel> {
        let removed = self.channels.write().remove(name);

        if let Some(ref channel) = removed {
            channel.close();
            self.prune_retired();

            if channel.has_counterpart() {
                self.retired
                    .write()
                    .insert(channel.name().clone(), channel.clone());
                debug!(channel = %name, "Channel removed from registry, retired");
            } else {
                debug!(channel = %name, "Channel removed from registry");
            }
        }

        removed
    }

    /// Closes and unregisters every channel.
    pub fn shutdown(&self) {
        info!("ChannelRegistry shutting down");

        let channels: Vec<_> = self.channels.write().drain().collect();
        for (name, channel) in channels {
            channel.close();
            debug!(channel = %name, "Channel closed during shutdown");
        }
        self.retired.write().clear();

        info!("ChannelRegistry shutdown complete");
    }

    /// Delivers envelopes in arrival order until the sender side closes.
    ///
    /// Envelopes for unknown channels are logged and skipped.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        debug!("Delivery loop started");

        while let Some(envelope) = rx.recv().await {
            if let Err(e) = self.deliver(envelope) {
                warn!(error = %e, "Envelope dropped");
            }
        }

        debug!("Delivery loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
