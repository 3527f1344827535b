//! Embedded control and container seams.
//!
//! [`WebView`] is the browser control the bridge drives. Synchronous
//! operations return directly; asynchronous ones receive a [`Completion`]
//! that the control resolves exactly once, from any thread.
//!
//! [`Container`] is the optional window hosting the control. Only the
//! container knows how to show, hide, or close itself.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;
use crate::transport::Completion;

use super::types::{ContentWorld, ScreenshotConfiguration, UrlRequest, UserScript, WebHistory};

// ============================================================================
// WebView
// ============================================================================

/// An embedded browser control.
///
/// Fallible synchronous operations return `Err` for control-reported
/// failures; the dispatcher turns those into `operation_failed` replies.
pub trait WebView: Send + Sync {
    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Current URL.
    fn url(&self) -> Option<String>;

    /// Current document title.
    fn title(&self) -> Option<String>;

    /// Returns `true` while a page is loading.
    fn is_loading(&self) -> bool;

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    fn load_url(&self, request: UrlRequest) -> Result<()>;

    fn load_file(&self, asset_file_path: &str) -> Result<()>;

    fn load_data(&self, data: &str) -> Result<()>;

    fn reload(&self);

    fn stop_loading(&self);

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    fn go_back(&self);

    fn can_go_back(&self) -> bool;

    fn go_forward(&self);

    fn can_go_forward(&self) -> bool;

    /// Moves `steps` entries through history; negative goes back.
    fn go_back_or_forward(&self, steps: i64);

    /// Checks whether `steps` is within the history list.
    fn can_go_back_or_forward(&self, steps: i64, completion: Completion<bool>);

    /// Snapshots the back/forward list.
    fn copy_back_forward_list(&self, completion: Completion<WebHistory>);

    // ------------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------------

    /// Evaluates `source`; completes with the JSON-encoded result.
    fn evaluate_javascript(
        &self,
        source: &str,
        content_world: ContentWorld,
        completion: Completion<String>,
    );

    /// Runs `function_body` as an async function with JSON `arguments`.
    fn call_async_javascript(
        &self,
        function_body: &str,
        arguments: &str,
        content_world: ContentWorld,
        completion: Completion<String>,
    );

    fn add_user_script(&self, script: UserScript) -> Result<()>;

    fn remove_user_script(&self, index: usize, script: UserScript) -> Result<()>;

    fn remove_user_scripts_by_group_name(&self, group_name: &str) -> Result<()>;

    fn remove_all_user_scripts(&self);

    // ------------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------------

    /// Captures the viewport; completes with `None` if nothing was captured.
    fn take_screenshot(
        &self,
        configuration: Option<ScreenshotConfiguration>,
        completion: Completion<Option<Vec<u8>>>,
    );

    // ------------------------------------------------------------------------
    // Container
    // ------------------------------------------------------------------------

    /// Window hosting this control, if any.
    fn container(&self) -> Option<Arc<dyn Container>> {
        None
    }
}

// ============================================================================
// Container
// ============================================================================

/// Window hosting a [`WebView`].
pub trait Container: Send + Sync {
    fn show(&self);

    fn hide(&self);

    fn close(&self);

    /// Receives title changes alongside the `onTitleChanged` event.
    fn did_change_title(&self, title: Option<&str>);
}
