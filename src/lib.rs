//! WebView Bridge - Asynchronous command/event bridge for embedded browsers.
//!
//! This library connects a host application to an embedded browser control
//! over named channels, without either side ever blocking on the other.
//!
//! # Architecture
//!
//! The bridge follows a command/event model:
//!
//! - **Host**: Sends commands, receives replies and events
//! - **Web view**: Executes commands on the control, emits events
//!
//! Key design principles:
//!
//! - Each [`WebViewBridge`] owns one [`Channel`] registered in an explicit
//!   [`ChannelRegistry`]
//! - Every command gets exactly one [`CommandReply`]
//! - Asynchronous operations reply through a one-shot [`Completion`]
//! - The bridge observes the web view weakly and tears down on drop
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use webview_bridge::{ChannelRegistry, HostEndpoint, Result, Value, WebView, WebViewBridge, WebViewId};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = ChannelRegistry::new();
//!     let webview: Arc<dyn WebView> = Arc::new(MyWebView::default());
//!
//!     // Bind the control on its channel
//!     let bridge = WebViewBridge::new(&registry, &WebViewId::from(1), &webview)?;
//!
//!     // Drive it from the host side
//!     let host = HostEndpoint::connect(bridge.channel(), registry.options());
//!     let title = host.call("getTitle", Value::Null).await?;
//!     println!("Page title: {title:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`options`] | [`BridgeOptions`] configuration |
//! | [`protocol`] | Command, reply and event message types |
//! | [`transport`] | Channels, registry and host endpoint |
//! | [`value`] | Structured [`Value`] payloads |
//! | [`webview`] | Web view binding, dispatch and events |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for bridge entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Bridge configuration.
pub mod options;

/// Protocol message types.
///
/// Commands, replies, events and the closed method table.
pub mod protocol;

/// Channel transport layer.
///
/// Channels, reply sinks, callbacks, the registry and the host endpoint.
pub mod transport;

/// Structured values.
pub mod value;

/// Web view side of the bridge.
///
/// - [`WebView`] - Embedded control seam
/// - [`WebViewBridge`] - Binding lifecycle owner
/// - [`EventEmitter`] - Outbound events
pub mod webview;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ChannelName, RequestId, WebViewId};

// Configuration
pub use options::BridgeOptions;

// Protocol types
pub use protocol::{CommandReply, CommandRequest, Envelope, Event, EventName, Incoming, Method, Outbound};

// Transport types
pub use transport::{
    Channel, ChannelRegistry, CommandHandler, Completion, EventHandler, HostEndpoint, ReplyCallback,
    ReplySink,
};

// Value types
pub use value::{Map, Value};

// Web view types
pub use webview::{
    Binding, BindingState, Container, EventEmitter, WebView, WebViewBridge, WebViewDispatcher,
};
