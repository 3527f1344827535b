//! In-process loopback between a host endpoint and a simulated web view.
//!
//! Demonstrates:
//! - Binding a web view on its conventional channel
//! - Sync and async commands from the host
//! - Events, including a navigation decision answered by the host
//! - Teardown: later commands reply `null`
//!
//! Usage:
//!   cargo run --example loopback
//!   cargo run --example loopback -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use webview_bridge::webview::{
    ContentWorld, NavigationAction, NavigationActionPolicy, ScreenshotConfiguration, UrlRequest,
    UserScript, WebHistory, WebHistoryItem,
};
use webview_bridge::{
    ChannelRegistry, Completion, Event, EventEmitter, EventName, HostEndpoint, Map, ReplyCallback,
    Result, Value, WebView, WebViewBridge, WebViewId,
};

// ============================================================================
// Simulated Web View
// ============================================================================

/// Keeps a history list and reports navigation through its emitter.
#[derive(Default)]
struct PageWebView {
    history: Mutex<(Vec<String>, usize)>,
    scripts: Mutex<Vec<UserScript>>,
    events: OnceLock<EventEmitter>,
}

impl PageWebView {
    fn events(&self) -> Option<&EventEmitter> {
        self.events.get()
    }

    fn current(&self) -> Option<String> {
        let history = self.history.lock();
        history.0.get(history.1).cloned()
    }

    fn commit(self: &Arc<Self>, url: String) {
        {
            let mut history = self.history.lock();
            let keep = (history.1 + 1).min(history.0.len());
            history.0.truncate(keep);
            history.0.push(url.clone());
            history.1 = history.0.len() - 1;
        }

        if let Some(events) = self.events() {
            events.on_load_start(Some(&url));
            events.on_update_visited_history(Some(&url), Some(false));
            events.on_title_changed(Some(&format!("Title of {url}")));
            events.on_load_stop(Some(&url));
        }
    }

    fn target(&self, steps: i64) -> Option<usize> {
        let history = self.history.lock();
        usize::try_from(history.1 as i64 + steps)
            .ok()
            .filter(|target| *target < history.0.len())
    }
}

/// Shares the page with the navigation callback.
struct Page(Arc<PageWebView>);

impl WebView for Page {
    fn url(&self) -> Option<String> {
        self.0.current()
    }

    fn title(&self) -> Option<String> {
        self.0.current().map(|url| format!("Title of {url}"))
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn load_url(&self, request: UrlRequest) -> Result<()> {
        let Some(events) = self.0.events() else {
            self.0.commit(request.url);
            return Ok(());
        };

        let page = Arc::clone(&self.0);
        let url = request.url.clone();
        events.should_override_url_loading(
            &NavigationAction::new(request),
            ReplyCallback::navigation_policy(move |policy| {
                if policy == NavigationActionPolicy::Allow {
                    page.commit(url);
                } else {
                    println!("        navigation to {url} cancelled by host");
                }
            }),
        );
        Ok(())
    }

    fn load_file(&self, asset_file_path: &str) -> Result<()> {
        self.0.commit(format!("asset:///{asset_file_path}"));
        Ok(())
    }

    fn load_data(&self, _data: &str) -> Result<()> {
        self.0.commit("about:blank".into());
        Ok(())
    }

    fn reload(&self) {}

    fn stop_loading(&self) {}

    fn go_back(&self) {
        self.go_back_or_forward(-1);
    }

    fn can_go_back(&self) -> bool {
        self.0.target(-1).is_some()
    }

    fn go_forward(&self) {
        self.go_back_or_forward(1);
    }

    fn can_go_forward(&self) -> bool {
        self.0.target(1).is_some()
    }

    fn go_back_or_forward(&self, steps: i64) {
        if let Some(target) = self.0.target(steps) {
            self.0.history.lock().1 = target;
        }
    }

    fn can_go_back_or_forward(&self, steps: i64, completion: Completion<bool>) {
        let feasible = self.0.target(steps).is_some();
        tokio::spawn(async move { completion.complete(feasible) });
    }

    fn copy_back_forward_list(&self, completion: Completion<WebHistory>) {
        let history = {
            let history = self.0.history.lock();
            WebHistory {
                list: history
                    .0
                    .iter()
                    .enumerate()
                    .map(|(i, url)| WebHistoryItem {
                        url: Some(url.clone()),
                        index: Some(i as i64),
                        offset: Some(i as i64 - history.1 as i64),
                        ..WebHistoryItem::default()
                    })
                    .collect(),
                current_index: Some(history.1 as i64),
            }
        };
        completion.complete(history);
    }

    fn evaluate_javascript(&self, source: &str, world: ContentWorld, completion: Completion<String>) {
        let result = format!("\"evaluated {source} in {}\"", world.name);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            completion.complete(result);
        });
    }

    fn call_async_javascript(
        &self,
        _function_body: &str,
        arguments: &str,
        _world: ContentWorld,
        completion: Completion<String>,
    ) {
        completion.complete(arguments.to_string());
    }

    fn add_user_script(&self, script: UserScript) -> Result<()> {
        self.0.scripts.lock().push(script);
        Ok(())
    }

    fn remove_user_script(&self, index: usize, _script: UserScript) -> Result<()> {
        let mut scripts = self.0.scripts.lock();
        if index < scripts.len() {
            scripts.remove(index);
        }
        Ok(())
    }

    fn remove_user_scripts_by_group_name(&self, group_name: &str) -> Result<()> {
        self.0
            .scripts
            .lock()
            .retain(|s| s.group_name.as_deref() != Some(group_name));
        Ok(())
    }

    fn remove_all_user_scripts(&self) {
        self.0.scripts.lock().clear();
    }

    fn take_screenshot(
        &self,
        _configuration: Option<ScreenshotConfiguration>,
        completion: Completion<Option<Vec<u8>>>,
    ) {
        completion.complete(None);
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    let filter = if debug {
        "webview_bridge=trace"
    } else {
        "webview_bridge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== Loopback ===\n");

    // ========================================================================
    // Bind
    // ========================================================================

    let registry = ChannelRegistry::new();
    let page = Arc::new(PageWebView::default());
    let webview: Arc<dyn WebView> = Arc::new(Page(Arc::clone(&page)));

    let bridge = WebViewBridge::new(&registry, &WebViewId::from(1), &webview)?;
    let _ = page.events.set(bridge.events().clone());
    println!("[Bind] channel {}", bridge.name());

    let host = HostEndpoint::connect(bridge.channel(), registry.options());
    host.set_event_handler(Arc::new(|event: &Event| {
        println!("        event {} {:?}", event.name, event.payload);
        match event.kind() {
            Some(EventName::ShouldOverrideUrlLoading) => {
                let url = event
                    .get("request")
                    .and_then(|r| r.get("url"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let policy = if url.contains("blocked") {
                    NavigationActionPolicy::Cancel
                } else {
                    NavigationActionPolicy::Allow
                };
                Some(policy.into())
            }
            _ => None,
        }
    }));

    // ========================================================================
    // Commands
    // ========================================================================

    println!("\n[Navigate]");
    for url in ["https://example.com", "https://blocked.example", "https://example.org"] {
        let mut request = Map::new();
        request.insert("url".into(), Value::from(url));
        let mut arguments = Map::new();
        arguments.insert("urlRequest".into(), Value::Map(request));
        host.call("loadUrl", arguments).await?;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n[Query]");
    println!("        url   = {:?}", host.call("getUrl", Value::Null).await?);
    println!("        title = {:?}", host.call("getTitle", Value::Null).await?);

    let mut steps = Map::new();
    steps.insert("steps".into(), Value::Int(-1));
    println!(
        "        goBackOrForward(-1) = {:?}",
        host.call("goBackOrForward", steps).await?
    );
    println!("        url   = {:?}", host.call("getUrl", Value::Null).await?);

    let mut source = Map::new();
    source.insert("source".into(), Value::from("document.title"));
    println!(
        "        evaluateJavascript = {:?}",
        host.call("evaluateJavascript", source).await?
    );

    println!(
        "        history = {:?}",
        host.call("getCopyBackForwardList", Value::Null).await?
    );

    match host.call("show", Value::Null).await {
        Ok(_) => println!("        show succeeded"),
        Err(e) => println!("        show: {e}"),
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    println!("\n[Teardown]");
    bridge.tear_down();
    println!(
        "        getUrl after teardown = {:?}",
        host.call("getUrl", Value::Null).await?
    );
    println!("        channels registered = {}", registry.channel_count());

    println!("\n=== Done ===");
    Ok(())
}
