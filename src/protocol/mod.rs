//! Bridge protocol message types.
//!
//! This module defines the messages exchanged between the host and a web
//! view binding.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `CommandRequest` | Host → Web view | Command with method name and arguments |
//! | `CommandReply` | Web view → Host | Exactly one per command |
//! | `Event` | Web view → Host | State change notification |
//! | `Incoming::EventReply` | Host → Web view | Answer to a reply-expecting event |
//!
//! # Method Naming
//!
//! Method and event names are plain camelCase strings (`loadUrl`,
//! `onTitleChanged`). They are the protocol and never change spelling.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Incoming/outbound traffic wrappers |
//! | `event` | Event and EventName types |
//! | `method` | Closed operation table |
//! | `reply` | CommandReply and failure codes |
//! | `request` | CommandRequest and argument decoding |

// ============================================================================
// Submodules
// ============================================================================

/// Incoming/outbound traffic wrappers.
pub mod envelope;

/// Event message types.
pub mod event;

/// Closed operation table.
pub mod method;

/// Command replies.
pub mod reply;

/// Command requests and argument decoding.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{Envelope, Incoming, Outbound};
pub use event::{Event, EventName};
pub use method::Method;
pub use reply::{CommandReply, INVALID_ARGUMENTS, OPERATION_FAILED};
pub use request::{Arguments, CommandRequest};
