//! Channel transport layer.
//!
//! This module carries commands, replies, and events between the host and
//! the web view side of the bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Host           │                              │  Web view       │
//! │                 │          Channel             │                 │
//! │  HostEndpoint   │◄────────────────────────────►│  CommandHandler │
//! │  (counterpart)  │   commands ► ◄ replies/events│  (dispatcher)   │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Message Lifecycle
//!
//! 1. `ChannelRegistry::open` - Register a named channel
//! 2. `Channel::set_handler` - Bind the web view side
//! 3. `HostEndpoint::connect` - Attach the host side
//! 4. Commands flow in, each answered once through a [`ReplySink`]
//! 5. Events flow out; reply-expecting events complete a [`ReplyCallback`]
//! 6. `ChannelRegistry::remove` - Close on teardown
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `callback` | Pending-reply callbacks for events |
//! | `channel` | Named channel and command handler seam |
//! | `host` | In-process host endpoint and event loop |
//! | `registry` | Explicit name → channel registry |
//! | `reply` | One-shot reply sinks and typed completions |

// ============================================================================
// Submodules
// ============================================================================

/// Pending-reply callbacks.
pub mod callback;

/// Named bidirectional channel.
pub mod channel;

/// Host endpoint and event loop.
pub mod host;

/// Channel registry.
pub mod registry;

/// Reply sinks and completions.
pub mod reply;

// ============================================================================
// Re-exports
// ============================================================================

pub use callback::{ReplyCallback, identity};
pub use channel::{Channel, CommandHandler, CounterpartId};
pub use host::{EventHandler, HostEndpoint};
pub use registry::ChannelRegistry;
pub use reply::{Completion, ReplySink};
