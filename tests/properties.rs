//! Property tests for the method table and argument checks.

mod common;

use std::sync::Arc;

use proptest::prelude::*;
use tokio::sync::mpsc;
use webview_bridge::protocol::INVALID_ARGUMENTS;
use webview_bridge::{
    ChannelRegistry, CommandReply, Map, Method, Outbound, RequestId, Value, WebView,
    WebViewBridge, WebViewId,
};

use common::MockWebView;

/// Methods with at least one required argument, and a full valid argument set.
fn required_arguments() -> Vec<(&'static str, Vec<(&'static str, Value)>)> {
    let script = Value::Map(Map::from([("source".to_string(), Value::from("x"))]));
    let request = Value::Map(Map::from([("url".to_string(), Value::from("https://a.test"))]));

    vec![
        ("loadUrl", vec![("urlRequest", request)]),
        ("loadFile", vec![("assetFilePath", Value::from("a.html"))]),
        ("loadData", vec![("data", Value::from("<p/>"))]),
        ("goBackOrForward", vec![("steps", Value::Int(1))]),
        ("canGoBackOrForward", vec![("steps", Value::Int(1))]),
        ("evaluateJavascript", vec![("source", Value::from("1"))]),
        (
            "callAsyncJavaScript",
            vec![
                ("functionBody", Value::from("return 1")),
                ("arguments", Value::from("{}")),
            ],
        ),
        ("addUserScript", vec![("userScript", script.clone())]),
        (
            "removeUserScript",
            vec![("index", Value::Int(0)), ("userScript", script)],
        ),
        ("removeUserScriptsByGroupName", vec![("groupName", Value::from("g"))]),
    ]
}

/// Binds a fresh mock and dispatches one command synchronously.
fn dispatch(method: &str, arguments: Value) -> (CommandReply, Vec<String>) {
    let registry = ChannelRegistry::new();
    let mock = Arc::new(MockWebView::default());
    let webview: Arc<dyn WebView> = Arc::clone(&mock) as Arc<dyn WebView>;
    let bridge = WebViewBridge::new(&registry, &WebViewId::from(1), &webview).expect("binds");

    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge.channel().attach_counterpart(tx);

    let id = RequestId::generate();
    bridge
        .channel()
        .handle_command(id, method.to_string(), arguments);

    let reply = match rx.try_recv().expect("replied before returning") {
        Outbound::Reply { id: reply_id, reply } => {
            assert_eq!(reply_id, id);
            reply
        }
        other => panic!("unexpected {other:?}"),
    };

    (reply, mock.calls())
}

proptest! {
    #[test]
    fn unknown_methods_not_implemented(name in "[a-zA-Z]{0,24}") {
        prop_assume!(Method::from_name(&name).is_none());

        let (reply, calls) = dispatch(&name, Value::Null);

        prop_assert!(reply.is_not_implemented());
        prop_assert!(calls.is_empty());
    }

    #[test]
    fn missing_required_argument_rejected(
        case in 0..required_arguments().len(),
        mask in any::<u8>(),
    ) {
        let (method, full) = required_arguments().swap_remove(case);
        let drop_mask = (mask % ((1 << full.len()) - 1)) + 1;

        // Drop a non-empty subset of the required keys
        let kept: Map = full
            .into_iter()
            .enumerate()
            .filter(|(i, _)| drop_mask & (1 << i) == 0)
            .map(|(_, (k, v))| (k.to_string(), v))
            .collect();

        let (reply, calls) = dispatch(method, Value::Map(kept));

        prop_assert_eq!(reply.failure_code(), Some(INVALID_ARGUMENTS));
        prop_assert!(calls.is_empty(), "{} reached the control: {:?}", method, calls);
    }

    #[test]
    fn null_required_argument_rejected(case in 0..required_arguments().len()) {
        let (method, full) = required_arguments().swap_remove(case);

        let nulled: Map = full
            .into_iter()
            .map(|(k, _)| (k.to_string(), Value::Null))
            .collect();

        let (reply, calls) = dispatch(method, Value::Map(nulled));

        prop_assert_eq!(reply.failure_code(), Some(INVALID_ARGUMENTS));
        prop_assert!(calls.is_empty());
    }
}

#[test]
fn full_arguments_accepted() {
    for (method, full) in required_arguments() {
        let arguments: Map = full.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let (reply, _) = dispatch(method, Value::Map(arguments));
        assert_ne!(reply.failure_code(), Some(INVALID_ARGUMENTS), "{method}");
    }
}
