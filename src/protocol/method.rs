//! Closed table of web view operations.
//!
//! Wire method names are fixed: host and web view are versioned
//! independently, so the strings below are the protocol. Lookup is an exact,
//! case-sensitive match.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Method
// ============================================================================

/// Every operation a web view binding understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Current URL.
    GetUrl,
    /// Current document title.
    GetTitle,
    /// Load a URL request.
    LoadUrl,
    /// Load a bundled asset file.
    LoadFile,
    /// Load inline HTML.
    LoadData,
    /// Reload the current page.
    Reload,
    /// One step back in history.
    GoBack,
    /// Whether a back step is possible.
    CanGoBack,
    /// One step forward in history.
    GoForward,
    /// Whether a forward step is possible.
    CanGoForward,
    /// Move `steps` through history if feasible.
    GoBackOrForward,
    /// Whether a `steps` move is possible.
    CanGoBackOrForward,
    /// Whether a load is in progress.
    IsLoading,
    /// Stop the current load.
    StopLoading,
    /// Evaluate script source in a content world.
    EvaluateJavascript,
    /// Call an async function body with JSON arguments.
    CallAsyncJavaScript,
    /// Snapshot of the history list.
    GetCopyBackForwardList,
    /// Register a user script.
    AddUserScript,
    /// Remove a user script by index.
    RemoveUserScript,
    /// Remove all user scripts of a group.
    RemoveUserScriptsByGroupName,
    /// Remove every user script.
    RemoveAllUserScripts,
    /// Capture the visible page.
    TakeScreenshot,
    /// Show the enclosing container.
    Show,
    /// Hide the enclosing container.
    Hide,
    /// Close the enclosing container.
    Close,
}

impl Method {
    /// All methods, in table order.
    pub const ALL: [Method; 25] = [
        Self::GetUrl,
        Self::GetTitle,
        Self::LoadUrl,
        Self::LoadFile,
        Self::LoadData,
        Self::Reload,
        Self::GoBack,
        Self::CanGoBack,
        Self::GoForward,
        Self::CanGoForward,
        Self::GoBackOrForward,
        Self::CanGoBackOrForward,
        Self::IsLoading,
        Self::StopLoading,
        Self::EvaluateJavascript,
        Self::CallAsyncJavaScript,
        Self::GetCopyBackForwardList,
        Self::AddUserScript,
        Self::RemoveUserScript,
        Self::RemoveUserScriptsByGroupName,
        Self::RemoveAllUserScripts,
        Self::TakeScreenshot,
        Self::Show,
        Self::Hide,
        Self::Close,
    ];

    /// Looks up a method by its wire name.
    ///
    /// Returns `None` for unknown names; matching is case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetUrl => "getUrl",
            Self::GetTitle => "getTitle",
            Self::LoadUrl => "loadUrl",
            Self::LoadFile => "loadFile",
            Self::LoadData => "loadData",
            Self::Reload => "reload",
            Self::GoBack => "goBack",
            Self::CanGoBack => "canGoBack",
            Self::GoForward => "goForward",
            Self::CanGoForward => "canGoForward",
            Self::GoBackOrForward => "goBackOrForward",
            Self::CanGoBackOrForward => "canGoBackOrForward",
            Self::IsLoading => "isLoading",
            Self::StopLoading => "stopLoading",
            Self::EvaluateJavascript => "evaluateJavascript",
            Self::CallAsyncJavaScript => "callAsyncJavaScript",
            Self::GetCopyBackForwardList => "getCopyBackForwardList",
            Self::AddUserScript => "addUserScript",
            Self::RemoveUserScript => "removeUserScript",
            Self::RemoveUserScriptsByGroupName => "removeUserScriptsByGroupName",
            Self::RemoveAllUserScripts => "removeAllUserScripts",
            Self::TakeScreenshot => "takeScreenshot",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Close => "close",
        }
    }

    /// Returns `true` for methods that exist only with a container attached.
    #[inline]
    #[must_use]
    pub const fn requires_container(&self) -> bool {
        matches!(self, Self::Show | Self::Hide | Self::Close)
    }

    /// Returns `true` for methods whose reply is delivered by a completion.
    #[inline]
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(
            self,
            Self::GoBackOrForward
                | Self::CanGoBackOrForward
                | Self::EvaluateJavascript
                | Self::CallAsyncJavaScript
                | Self::GetCopyBackForwardList
                | Self::TakeScreenshot
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
