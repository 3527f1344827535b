//! Event emission and host answers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use webview_bridge::webview::{NavigationAction, NavigationActionPolicy, UrlRequest};
use webview_bridge::{Event, EventName, ReplyCallback, Value};

use common::{Harness, MockContainer, MockWebView};

/// Records every event the host sees and answers with `answer`.
fn record_events(h: &Harness, answer: Option<Value>) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    h.host.set_event_handler(Arc::new(move |event: &Event| {
        sink.lock().push(event.clone());
        answer.clone()
    }));
    seen
}

async fn wait_for(seen: &Arc<Mutex<Vec<Event>>>, count: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while seen.lock().len() < count {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("events arrive");
}

#[tokio::test]
async fn events_arrive_in_emission_order() {
    let h = Harness::new();
    let seen = record_events(&h, None);

    let events = h.bridge.events();
    events.on_load_start(Some("https://a.test"));
    events.on_update_visited_history(Some("https://a.test"), Some(false));
    events.on_load_stop(Some("https://a.test"));

    wait_for(&seen, 3).await;
    let kinds: Vec<_> = seen.lock().iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        vec![
            Some(EventName::LoadStart),
            Some(EventName::UpdateVisitedHistory),
            Some(EventName::LoadStop)
        ]
    );
    assert_eq!(seen.lock()[1].get_optional_bool("isReload"), Some(false));
}

#[tokio::test]
async fn navigation_policy_from_host() {
    let h = Harness::new();
    let _seen = record_events(&h, Some(Value::Int(1)));

    let (tx, rx) = oneshot::channel();
    h.bridge.events().should_override_url_loading(
        &NavigationAction::new(UrlRequest::new("https://a.test")),
        ReplyCallback::navigation_policy(move |policy| {
            let _ = tx.send(policy);
        }),
    );

    assert_eq!(rx.await.expect("decided"), NavigationActionPolicy::Allow);
}

#[tokio::test]
async fn null_navigation_answer_cancels() {
    let h = Harness::new();
    let _seen = record_events(&h, Some(Value::Null));

    let (tx, rx) = oneshot::channel();
    h.bridge.events().should_override_url_loading(
        &NavigationAction::new(UrlRequest::new("https://a.test")),
        ReplyCallback::navigation_policy(move |policy| {
            let _ = tx.send(policy);
        }),
    );

    assert_eq!(rx.await.expect("decided"), NavigationActionPolicy::Cancel);
}

#[tokio::test]
async fn js_handler_answer_passes_through() {
    let h = Harness::new();
    let answer = Value::List(vec![Value::Int(1), Value::from("two")]);
    let seen = record_events(&h, Some(answer.clone()));

    let (callback, rx) = ReplyCallback::oneshot(webview_bridge::transport::identity);
    h.bridge.events().on_call_js_handler("sum", "[1,2]", callback);

    assert_eq!(rx.await.expect("answered"), Some(answer));
    assert_eq!(seen.lock()[0].get_string("handlerName"), "sum");
}

#[tokio::test]
async fn title_change_reaches_container_without_counterpart() {
    let container = Arc::new(MockContainer::default());
    let h = Harness::with_mock(MockWebView::with_container(Arc::clone(&container)));
    h.host.shutdown();
    assert!(!h.bridge.channel().has_counterpart());

    h.bridge.events().on_title_changed(Some("Example"));

    assert_eq!(*container.titles.lock(), vec![Some("Example".to_string())]);
}

#[tokio::test]
async fn title_change_reaches_host_and_container() {
    let container = Arc::new(MockContainer::default());
    let h = Harness::with_mock(MockWebView::with_container(Arc::clone(&container)));
    let seen = record_events(&h, None);

    h.bridge.events().on_title_changed(Some("Example"));

    wait_for(&seen, 1).await;
    assert_eq!(seen.lock()[0].get_string("title"), "Example");
    assert_eq!(*container.titles.lock(), vec![Some("Example".to_string())]);
}

#[tokio::test]
async fn reply_expecting_event_without_counterpart_completes_absent() {
    let h = Harness::new();
    h.host.shutdown();

    let (callback, rx) = ReplyCallback::oneshot(webview_bridge::transport::identity);
    h.bridge.events().on_call_js_handler("h", "[]", callback);

    assert_eq!(rx.await.expect("answered"), None);
    assert_eq!(h.bridge.channel().pending_count(), 0);
}
