//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use webview_bridge::webview::{
    ContentWorld, ScreenshotConfiguration, UrlRequest, UserScript, WebHistory, WebHistoryItem,
};
use webview_bridge::{
    BridgeOptions, ChannelRegistry, Completion, Container, Error, HostEndpoint, Result, Value,
    WebView, WebViewBridge, WebViewId,
};

// ============================================================================
// Tracing
// ============================================================================

/// Installs a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// MockContainer
// ============================================================================

/// Container that records what it was asked to do.
#[derive(Default)]
pub struct MockContainer {
    pub calls: Mutex<Vec<String>>,
    pub titles: Mutex<Vec<Option<String>>>,
}

impl Container for MockContainer {
    fn show(&self) {
        self.calls.lock().push("show".into());
    }

    fn hide(&self) {
        self.calls.lock().push("hide".into());
    }

    fn close(&self) {
        self.calls.lock().push("close".into());
    }

    fn did_change_title(&self, title: Option<&str>) {
        self.titles.lock().push(title.map(str::to_string));
    }
}

// ============================================================================
// MockWebView
// ============================================================================

struct State {
    title: Option<String>,
    loading: bool,
    history: Vec<String>,
    index: usize,
    scripts: Vec<UserScript>,
}

type Deferred = Box<dyn FnOnce() + Send>;

/// In-memory web view.
///
/// Every control call is recorded by name. With `defer` set, async
/// completions are parked until `run_deferred` or `drop_deferred`.
pub struct MockWebView {
    calls: Mutex<Vec<String>>,
    loads: Mutex<Vec<UrlRequest>>,
    evaluations: Mutex<Vec<(String, ContentWorld)>>,
    state: Mutex<State>,
    container: Option<Arc<MockContainer>>,
    fail_loads: AtomicBool,
    defer: AtomicBool,
    deferred: Mutex<Vec<Deferred>>,
}

impl Default for MockWebView {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
            evaluations: Mutex::new(Vec::new()),
            state: Mutex::new(State {
                title: Some("Start".into()),
                loading: false,
                history: vec!["about:blank".into()],
                index: 0,
                scripts: Vec::new(),
            }),
            container: None,
            fail_loads: AtomicBool::new(false),
            defer: AtomicBool::new(false),
            deferred: Mutex::new(Vec::new()),
        }
    }
}

impl MockWebView {
    pub fn with_container(container: Arc<MockContainer>) -> Self {
        Self {
            container: Some(container),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn loads(&self) -> Vec<UrlRequest> {
        self.loads.lock().clone()
    }

    pub fn evaluations(&self) -> Vec<(String, ContentWorld)> {
        self.evaluations.lock().clone()
    }

    pub fn scripts(&self) -> Vec<UserScript> {
        self.state.lock().scripts.clone()
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().title = Some(title.into());
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_defer(&self, defer: bool) {
        self.defer.store(defer, Ordering::SeqCst);
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.lock().len()
    }

    /// Runs parked completions, most recent first.
    pub fn run_deferred_reversed(&self) {
        let parked: Vec<_> = self.deferred.lock().drain(..).collect();
        for completion in parked.into_iter().rev() {
            completion();
        }
    }

    /// Discards parked completions without running them.
    pub fn drop_deferred(&self) {
        self.deferred.lock().clear();
    }

    /// Appends history entries after the current one.
    pub fn push_history(&self, urls: &[&str]) {
        let mut state = self.state.lock();
        for url in urls {
            state.history.push((*url).to_string());
        }
        state.index = state.history.len() - 1;
    }

    fn record(&self, name: &str) {
        self.calls.lock().push(name.to_string());
    }

    fn finish(&self, completion: impl FnOnce() + Send + 'static) {
        if self.defer.load(Ordering::SeqCst) {
            self.deferred.lock().push(Box::new(completion));
        } else {
            completion();
        }
    }

    fn target_index(&self, steps: i64) -> Option<usize> {
        let state = self.state.lock();
        let target = state.index as i64 + steps;
        usize::try_from(target)
            .ok()
            .filter(|target| *target < state.history.len())
    }
}

impl WebView for MockWebView {
    fn url(&self) -> Option<String> {
        self.record("url");
        let state = self.state.lock();
        state.history.get(state.index).cloned()
    }

    fn title(&self) -> Option<String> {
        self.record("title");
        self.state.lock().title.clone()
    }

    fn is_loading(&self) -> bool {
        self.record("is_loading");
        self.state.lock().loading
    }

    fn load_url(&self, request: UrlRequest) -> Result<()> {
        self.record("load_url");
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::operation_failed_with(
                "load refused",
                Value::from(request.url.as_str()),
            ));
        }
        self.push_history(&[request.url.as_str()]);
        self.state.lock().loading = true;
        self.loads.lock().push(request);
        Ok(())
    }

    fn load_file(&self, asset_file_path: &str) -> Result<()> {
        self.record("load_file");
        let url = format!("asset://{asset_file_path}");
        self.push_history(&[url.as_str()]);
        Ok(())
    }

    fn load_data(&self, _data: &str) -> Result<()> {
        self.record("load_data");
        self.push_history(&["about:data"]);
        Ok(())
    }

    fn reload(&self) {
        self.record("reload");
    }

    fn stop_loading(&self) {
        self.record("stop_loading");
        self.state.lock().loading = false;
    }

    fn go_back(&self) {
        self.record("go_back");
        let mut state = self.state.lock();
        state.index = state.index.saturating_sub(1);
    }

    fn can_go_back(&self) -> bool {
        self.record("can_go_back");
        self.state.lock().index > 0
    }

    fn go_forward(&self) {
        self.record("go_forward");
        let mut state = self.state.lock();
        if state.index + 1 < state.history.len() {
            state.index += 1;
        }
    }

    fn can_go_forward(&self) -> bool {
        self.record("can_go_forward");
        let state = self.state.lock();
        state.index + 1 < state.history.len()
    }

    fn go_back_or_forward(&self, steps: i64) {
        self.record("go_back_or_forward");
        if let Some(target) = self.target_index(steps) {
            self.state.lock().index = target;
        }
    }

    fn can_go_back_or_forward(&self, steps: i64, completion: Completion<bool>) {
        self.record("can_go_back_or_forward");
        let feasible = self.target_index(steps).is_some();
        self.finish(move || completion.complete(feasible));
    }

    fn copy_back_forward_list(&self, completion: Completion<WebHistory>) {
        self.record("copy_back_forward_list");
        let history = {
            let state = self.state.lock();
            WebHistory {
                list: state
                    .history
                    .iter()
                    .enumerate()
                    .map(|(i, url)| WebHistoryItem {
                        original_url: Some(url.clone()),
                        title: None,
                        url: Some(url.clone()),
                        index: Some(i as i64),
                        offset: Some(i as i64 - state.index as i64),
                    })
                    .collect(),
                current_index: Some(state.index as i64),
            }
        };
        self.finish(move || completion.complete(history));
    }

    fn evaluate_javascript(
        &self,
        source: &str,
        content_world: ContentWorld,
        completion: Completion<String>,
    ) {
        self.record("evaluate_javascript");
        self.evaluations
            .lock()
            .push((source.to_string(), content_world));
        let result = match source {
            "1+1" => "2".to_string(),
            "throw" => {
                self.finish(move || completion.fail(Error::operation_failed("script threw")));
                return;
            }
            other => format!("{other:?}"),
        };
        self.finish(move || completion.complete(result));
    }

    fn call_async_javascript(
        &self,
        function_body: &str,
        arguments: &str,
        content_world: ContentWorld,
        completion: Completion<String>,
    ) {
        self.record("call_async_javascript");
        let result = format!("{}({arguments})@{}", function_body, content_world.name);
        self.finish(move || completion.complete(result));
    }

    fn add_user_script(&self, script: UserScript) -> Result<()> {
        self.record("add_user_script");
        self.state.lock().scripts.push(script);
        Ok(())
    }

    fn remove_user_script(&self, index: usize, script: UserScript) -> Result<()> {
        self.record("remove_user_script");
        let mut state = self.state.lock();
        if state.scripts.get(index) != Some(&script) {
            return Err(Error::operation_failed("no such user script"));
        }
        state.scripts.remove(index);
        Ok(())
    }

    fn remove_user_scripts_by_group_name(&self, group_name: &str) -> Result<()> {
        self.record("remove_user_scripts_by_group_name");
        self.state
            .lock()
            .scripts
            .retain(|s| s.group_name.as_deref() != Some(group_name));
        Ok(())
    }

    fn remove_all_user_scripts(&self) {
        self.record("remove_all_user_scripts");
        self.state.lock().scripts.clear();
    }

    fn take_screenshot(
        &self,
        configuration: Option<ScreenshotConfiguration>,
        completion: Completion<Option<Vec<u8>>>,
    ) {
        self.record("take_screenshot");
        let bytes = match configuration {
            Some(config) if config.quality == 0 => None,
            _ => Some(vec![0x89, b'P', b'N', b'G']),
        };
        self.finish(move || completion.complete(bytes));
    }

    fn container(&self) -> Option<Arc<dyn Container>> {
        self.container
            .as_ref()
            .map(|c| Arc::clone(c) as Arc<dyn Container>)
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Registry, bound mock web view, and attached host endpoint.
pub struct Harness {
    pub registry: Arc<ChannelRegistry>,
    pub mock: Arc<MockWebView>,
    pub webview: Arc<dyn WebView>,
    pub bridge: WebViewBridge,
    pub host: HostEndpoint,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_mock(MockWebView::default())
    }

    pub fn with_mock(mock: MockWebView) -> Self {
        init_tracing();

        let registry = ChannelRegistry::with_options(
            BridgeOptions::new().with_command_timeout(std::time::Duration::from_secs(2)),
        );
        let mock = Arc::new(mock);
        let webview: Arc<dyn WebView> = Arc::clone(&mock) as Arc<dyn WebView>;
        let bridge =
            WebViewBridge::new(&registry, &WebViewId::from(1), &webview).expect("bridge binds");
        let host = HostEndpoint::connect(bridge.channel(), registry.options());

        Self {
            registry,
            mock,
            webview,
            bridge,
            host,
        }
    }
}

/// Builds an argument map.
pub fn args<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}
