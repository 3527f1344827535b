//! Command dispatcher for a bound web view.
//!
//! Dispatch runs in two phases. [`Call::decode`] turns a method name and
//! argument map into a typed call, failing with `invalid_arguments` before
//! the control is touched. [`WebViewDispatcher`] then executes the call and
//! answers through the [`ReplySink`], either directly or from a
//! [`Completion`] the control resolves later.
//!
//! # Reply Rules
//!
//! | Situation | Reply |
//! |-----------|-------|
//! | Target gone | `Success(null)` |
//! | Unknown method | `NotImplemented` |
//! | Container method, no container | `NotImplemented` |
//! | Bad arguments | `Failure("invalid_arguments")` |
//! | Control error | `Failure("operation_failed")` |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::ChannelName;
use crate::protocol::{Arguments, CommandRequest, Method};
use crate::transport::{CommandHandler, Completion, ReplySink};
use crate::value::{Map, Value};

use super::binding::Binding;
use super::control::{Container, WebView};
use super::types::{ContentWorld, ScreenshotConfiguration, UrlRequest, UserScript};

// ============================================================================
// Call
// ============================================================================

/// A decoded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetUrl,
    GetTitle,
    LoadUrl(UrlRequest),
    LoadFile(String),
    LoadData(String),
    Reload,
    GoBack,
    CanGoBack,
    GoForward,
    CanGoForward,
    GoBackOrForward(i64),
    CanGoBackOrForward(i64),
    IsLoading,
    StopLoading,
    EvaluateJavascript {
        source: String,
        content_world: ContentWorld,
    },
    CallAsyncJavaScript {
        function_body: String,
        arguments: String,
        content_world: ContentWorld,
    },
    GetCopyBackForwardList,
    AddUserScript(UserScript),
    RemoveUserScript {
        index: usize,
        script: UserScript,
    },
    RemoveUserScriptsByGroupName(String),
    RemoveAllUserScripts,
    TakeScreenshot(Option<ScreenshotConfiguration>),
    Show,
    Hide,
    Close,
}

impl Call {
    /// Decodes the arguments for `method`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for missing or mistyped keys.
    pub fn decode(method: Method, args: &Map) -> Result<Self> {
        let call = match method {
            Method::GetUrl => Self::GetUrl,
            Method::GetTitle => Self::GetTitle,
            Method::LoadUrl => {
                Self::LoadUrl(UrlRequest::from_map(&args.required::<Map>("urlRequest")?)?)
            }
            Method::LoadFile => Self::LoadFile(args.required("assetFilePath")?),
            Method::LoadData => Self::LoadData(args.required("data")?),
            Method::Reload => Self::Reload,
            Method::GoBack => Self::GoBack,
            Method::CanGoBack => Self::CanGoBack,
            Method::GoForward => Self::GoForward,
            Method::CanGoForward => Self::CanGoForward,
            Method::GoBackOrForward => Self::GoBackOrForward(args.required("steps")?),
            Method::CanGoBackOrForward => Self::CanGoBackOrForward(args.required("steps")?),
            Method::IsLoading => Self::IsLoading,
            Method::StopLoading => Self::StopLoading,
            Method::EvaluateJavascript => Self::EvaluateJavascript {
                source: args.required("source")?,
                content_world: content_world(args)?,
            },
            Method::CallAsyncJavaScript => Self::CallAsyncJavaScript {
                function_body: args.required("functionBody")?,
                arguments: args.required("arguments")?,
                content_world: content_world(args)?,
            },
            Method::GetCopyBackForwardList => Self::GetCopyBackForwardList,
            Method::AddUserScript => {
                Self::AddUserScript(UserScript::from_map(&args.required::<Map>("userScript")?)?)
            }
            Method::RemoveUserScript => {
                let index = usize::try_from(args.required::<i64>("index")?)
                    .map_err(|_| Error::argument_type("index", "a non-negative integer"))?;
                Self::RemoveUserScript {
                    index,
                    script: UserScript::from_map(&args.required::<Map>("userScript")?)?,
                }
            }
            Method::RemoveUserScriptsByGroupName => {
                Self::RemoveUserScriptsByGroupName(args.required("groupName")?)
            }
            Method::RemoveAllUserScripts => Self::RemoveAllUserScripts,
            Method::TakeScreenshot => Self::TakeScreenshot(
                args.optional::<Map>("screenshotConfiguration")?
                    .map(|config| ScreenshotConfiguration::from_map(&config))
                    .transpose()?,
            ),
            Method::Show => Self::Show,
            Method::Hide => Self::Hide,
            Method::Close => Self::Close,
        };
        Ok(call)
    }
}

/// Optional `contentWorld`, defaulting to the page world.
fn content_world(args: &Map) -> Result<ContentWorld> {
    match args.optional::<Map>("contentWorld")? {
        Some(world) => ContentWorld::from_map(&world),
        None => Ok(ContentWorld::page()),
    }
}

// ============================================================================
// WebViewDispatcher
// ============================================================================

/// [`CommandHandler`] that drives a bound [`WebView`].
pub struct WebViewDispatcher {
    /// Channel name, for logs.
    channel: ChannelName,
    /// Target observed through the binding.
    binding: Arc<Binding<dyn WebView>>,
}

impl WebViewDispatcher {
    /// Creates a dispatcher reading its target through `binding`.
    #[must_use]
    pub fn new(channel: ChannelName, binding: Arc<Binding<dyn WebView>>) -> Self {
        Self { channel, binding }
    }

    /// Runs a decoded call; `reply` is consumed exactly once.
    fn execute(&self, target: Arc<dyn WebView>, call: Call, reply: ReplySink) {
        match call {
            Call::GetUrl => reply.success(target.url()),
            Call::GetTitle => reply.success(target.title()),
            Call::LoadUrl(request) => reply_unit(reply, target.load_url(request)),
            Call::LoadFile(path) => reply_unit(reply, target.load_file(&path)),
            Call::LoadData(data) => reply_unit(reply, target.load_data(&data)),
            Call::Reload => {
                target.reload();
                reply.success(true);
            }
            Call::GoBack => {
                target.go_back();
                reply.success(true);
            }
            Call::CanGoBack => reply.success(target.can_go_back()),
            Call::GoForward => {
                target.go_forward();
                reply.success(true);
            }
            Call::CanGoForward => reply.success(target.can_go_forward()),
            Call::GoBackOrForward(steps) => self.go_back_or_forward(&target, steps, reply),
            Call::CanGoBackOrForward(steps) => {
                target.can_go_back_or_forward(steps, Completion::reply(reply));
            }
            Call::IsLoading => reply.success(target.is_loading()),
            Call::StopLoading => {
                target.stop_loading();
                reply.success(true);
            }
            Call::EvaluateJavascript {
                source,
                content_world,
            } => target.evaluate_javascript(&source, content_world, Completion::reply(reply)),
            Call::CallAsyncJavaScript {
                function_body,
                arguments,
                content_world,
            } => target.call_async_javascript(
                &function_body,
                &arguments,
                content_world,
                Completion::reply(reply),
            ),
            Call::GetCopyBackForwardList => {
                target.copy_back_forward_list(Completion::reply(reply));
            }
            Call::AddUserScript(script) => reply_unit(reply, target.add_user_script(script)),
            Call::RemoveUserScript { index, script } => {
                reply_unit(reply, target.remove_user_script(index, script));
            }
            Call::RemoveUserScriptsByGroupName(group) => {
                reply_unit(reply, target.remove_user_scripts_by_group_name(&group));
            }
            Call::RemoveAllUserScripts => {
                target.remove_all_user_scripts();
                reply.success(true);
            }
            Call::TakeScreenshot(configuration) => {
                target.take_screenshot(configuration, Completion::reply(reply));
            }
            Call::Show => with_container(&target, reply, |container| container.show()),
            Call::Hide => with_container(&target, reply, |container| container.hide()),
            Call::Close => with_container(&target, reply, |container| container.close()),
        }
    }

    /// Checks feasibility first, then moves.
    ///
    /// The target is re-read when the check completes; if it went away in
    /// between, the reply is `null`.
    fn go_back_or_forward(&self, target: &Arc<dyn WebView>, steps: i64, reply: ReplySink) {
        let binding = Arc::clone(&self.binding);

        target.can_go_back_or_forward(
            steps,
            Completion::new(move |result| match result {
                Ok(true) => match binding.target() {
                    Some(target) => {
                        target.go_back_or_forward(steps);
                        reply.success(true);
                    }
                    None => reply.success(Value::Null),
                },
                Ok(false) => reply.success(false),
                Err(e) => reply.error(e),
            }),
        );
    }
}

impl CommandHandler for WebViewDispatcher {
    fn handle(&self, request: CommandRequest, reply: ReplySink) {
        let Some(target) = self.binding.target() else {
            trace!(channel = %self.channel, method = %request.method, "Target gone, replying null");
            reply.success(Value::Null);
            return;
        };

        let Some(method) = Method::from_name(&request.method) else {
            debug!(channel = %self.channel, method = %request.method, "Unknown method");
            reply.not_implemented();
            return;
        };

        if method.requires_container() && target.container().is_none() {
            debug!(channel = %self.channel, method = %method, "No container attached");
            reply.not_implemented();
            return;
        }

        let call = match Call::decode(method, &request.arguments) {
            Ok(call) => call,
            Err(e) => {
                debug!(channel = %self.channel, method = %method, error = %e, "Invalid arguments");
                reply.error(e);
                return;
            }
        };

        trace!(channel = %self.channel, method = %method, request_id = %reply.id(), "Dispatching");
        self.execute(target, call, reply);
    }
}

/// Runs `action` on the container; `NotImplemented` without one.
fn with_container(target: &Arc<dyn WebView>, reply: ReplySink, action: impl FnOnce(&dyn Container)) {
    match target.container() {
        Some(container) => {
            action(container.as_ref());
            reply.success(true);
        }
        None => reply.not_implemented(),
    }
}

/// Replies `true`, or the control's failure.
fn reply_unit(reply: ReplySink, result: Result<()>) {
    match result {
        Ok(()) => reply.success(true),
        Err(e) => reply.error(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
