//! Dispatch benchmark suite.
//!
//! Benchmarks command dispatch at different scales:
//! - Direct channel dispatch (sync and async operations)
//! - Host round trips across 1, 16 and 64 concurrent bridges
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use webview_bridge::webview::{
    ContentWorld, ScreenshotConfiguration, UrlRequest, UserScript, WebHistory,
};
use webview_bridge::{
    ChannelRegistry, Completion, HostEndpoint, Map, RequestId, Result, Value, WebView,
    WebViewBridge, WebViewId,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const BRIDGE_COUNTS: &[usize] = &[1, 16, 64];

// ============================================================================
// Fixture
// ============================================================================

/// Web view that answers everything immediately.
struct StaticWebView;

impl WebView for StaticWebView {
    fn url(&self) -> Option<String> {
        Some("https://example.com".into())
    }

    fn title(&self) -> Option<String> {
        Some("Example".into())
    }

    fn is_loading(&self) -> bool {
        false
    }

    fn load_url(&self, _request: UrlRequest) -> Result<()> {
        Ok(())
    }

    fn load_file(&self, _asset_file_path: &str) -> Result<()> {
        Ok(())
    }

    fn load_data(&self, _data: &str) -> Result<()> {
        Ok(())
    }

    fn reload(&self) {}

    fn stop_loading(&self) {}

    fn go_back(&self) {}

    fn can_go_back(&self) -> bool {
        false
    }

    fn go_forward(&self) {}

    fn can_go_forward(&self) -> bool {
        false
    }

    fn go_back_or_forward(&self, _steps: i64) {}

    fn can_go_back_or_forward(&self, steps: i64, completion: Completion<bool>) {
        completion.complete(steps == 0);
    }

    fn copy_back_forward_list(&self, completion: Completion<WebHistory>) {
        completion.complete(WebHistory::default());
    }

    fn evaluate_javascript(&self, source: &str, _world: ContentWorld, completion: Completion<String>) {
        completion.complete(source.to_string());
    }

    fn call_async_javascript(
        &self,
        function_body: &str,
        _arguments: &str,
        _world: ContentWorld,
        completion: Completion<String>,
    ) {
        completion.complete(function_body.to_string());
    }

    fn add_user_script(&self, _script: UserScript) -> Result<()> {
        Ok(())
    }

    fn remove_user_script(&self, _index: usize, _script: UserScript) -> Result<()> {
        Ok(())
    }

    fn remove_user_scripts_by_group_name(&self, _group_name: &str) -> Result<()> {
        Ok(())
    }

    fn remove_all_user_scripts(&self) {}

    fn take_screenshot(
        &self,
        _configuration: Option<ScreenshotConfiguration>,
        completion: Completion<Option<Vec<u8>>>,
    ) {
        completion.complete(None);
    }
}

fn load_url_arguments() -> Value {
    let request = Map::from([("url".to_string(), Value::from("https://example.com"))]);
    Value::Map(Map::from([("urlRequest".to_string(), Value::Map(request))]))
}

// ============================================================================
// Benchmark: Direct Dispatch
// ============================================================================

fn bench_direct_dispatch(c: &mut Criterion) {
    let registry = ChannelRegistry::new();
    let webview: Arc<dyn WebView> = Arc::new(StaticWebView);
    let bridge = WebViewBridge::new(&registry, &WebViewId::from(1), &webview)
        .expect("bridge binds");
    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge.channel().attach_counterpart(tx);

    let mut group = c.benchmark_group("direct_dispatch");

    let cases = [
        ("getTitle", Value::Null),
        ("loadUrl", load_url_arguments()),
        (
            "evaluateJavascript",
            Value::Map(Map::from([("source".to_string(), Value::from("1+1"))])),
        ),
        ("unknownMethod", Value::Null),
    ];

    for (method, arguments) in cases {
        group.bench_with_input(BenchmarkId::new("method", method), &arguments, |b, args| {
            b.iter(|| {
                bridge
                    .channel()
                    .handle_command(RequestId::generate(), method.to_string(), args.clone());
                rx.try_recv().expect("reply")
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Host Round Trips
// ============================================================================

fn bench_host_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("host_round_trip");

    for &count in BRIDGE_COUNTS {
        let registry = ChannelRegistry::new();
        let webview: Arc<dyn WebView> = Arc::new(StaticWebView);

        let (bridges, hosts): (Vec<_>, Vec<_>) = rt.block_on(async {
            (0..count)
                .map(|i| {
                    let bridge = WebViewBridge::new(&registry, &WebViewId::from(i as i64), &webview)
                        .expect("bridge binds");
                    let host = HostEndpoint::connect(bridge.channel(), registry.options());
                    (bridge, host)
                })
                .unzip()
        });

        group.bench_with_input(BenchmarkId::new("bridges", count), &hosts, |b, hosts| {
            b.to_async(&rt).iter(|| async move {
                let calls = hosts
                    .iter()
                    .map(|host| host.call("loadUrl", load_url_arguments()));
                futures_util::future::try_join_all(calls)
                    .await
                    .expect("all replies")
            });
        });

        drop(hosts);
        drop(bridges);
    }

    group.finish();
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(benches, bench_direct_dispatch, bench_host_round_trip);
criterion_main!(benches);
