//! Web view side of the bridge.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `binding` | Weak, lifecycle-tracked target reference |
//! | `bridge` | Channel + binding owner with drop teardown |
//! | `control` | [`WebView`] and [`Container`] seams |
//! | `dispatch` | Command decoding and dispatch |
//! | `events` | Outbound event emitter |
//! | `types` | Payload types and their map forms |

// ============================================================================
// Submodules
// ============================================================================

pub mod binding;
pub mod bridge;
pub mod control;
pub mod dispatch;
pub mod events;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use binding::{Binding, BindingState};
pub use bridge::WebViewBridge;
pub use control::{Container, WebView};
pub use dispatch::{Call, WebViewDispatcher};
pub use events::EventEmitter;
pub use types::{
    CompressFormat, ConsoleMessageLevel, ContentWorld, Headers, NavigationAction,
    NavigationActionPolicy, Rect, ScreenshotConfiguration, UrlRequest, UserScript,
    UserScriptInjectionTime, WebHistory, WebHistoryItem, WebResourceError, WebResourceRequest,
    WebResourceResponse,
};
