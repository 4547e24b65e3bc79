//! End-to-end tests for the HTTP dispatcher against a mock listener.
//!
//! Sends are made straight from async test bodies: the dispatcher must block
//! the caller without disturbing the runtime it is called from.

use std::{
    cell::RefCell,
    rc::Rc,
    time::{Duration, Instant},
};

use dbug::{DispatchConfig, Dispatcher, Inspect};
use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method},
    Mock, MockServer, Request, ResponseTemplate,
};

#[derive(Inspect)]
pub struct Ring {
    pub id: u8,
    pub next: RefCell<Option<Rc<Ring>>>,
}

fn config_for(server: &MockServer) -> DispatchConfig {
    DispatchConfig::new()
        .with_endpoint(server.uri())
        .with_timeout_ms(500)
        .with_pause_ms(10)
}

async fn mount_ok(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected)
        .mount(server)
        .await;
}

fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("body should be JSON")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_each_payload_is_its_own_request_in_order() {
    let server = MockServer::start().await;
    mount_ok(&server, 3).await;

    let config = config_for(&server);
    let dispatcher = Dispatcher::new(config);
    dispatcher.send_all(&[&"first", &vec![2, 3], &Some(4.5)]);

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<Value> = requests.iter().map(body_json).collect();
    assert_eq!(bodies, vec![json!("first"), json!([2, 3]), json!(4.5)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_body_is_pretty_printed() {
    let server = MockServer::start().await;
    mount_ok(&server, 1).await;

    let config = config_for(&server);
    Dispatcher::new(config).send(&vec![1, 2]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        String::from_utf8_lossy(&requests[0].body),
        "[\n  1,\n  2\n]"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cyclic_payload_is_delivered() {
    let server = MockServer::start().await;
    mount_ok(&server, 1).await;

    let config = config_for(&server);
    {
        let ring = Rc::new(Ring {
            id: 1,
            next: RefCell::new(None),
        });
        *ring.next.borrow_mut() = Some(Rc::clone(&ring));
        Dispatcher::new(config).send(&ring);
        ring.next.borrow_mut().take();
    }

    let requests = server.received_requests().await.unwrap();
    let body = body_json(&requests[0]);
    let prefix = std::any::type_name::<Ring>();
    assert_eq!(body[format!("{prefix}.id")], json!(1));
    assert_eq!(body[format!("{prefix}.next")], json!("[circular]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_payload_sends_failure_document() {
    let server = MockServer::start().await;
    mount_ok(&server, 2).await;

    let config = config_for(&server);
    Dispatcher::new(config).send_all(&[&f64::NAN, &"after"]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        body_json(&requests[0]),
        json!({ "error": "Serialization failed", "reason": "unsupported value: NaN" })
    );
    assert_eq!(body_json(&requests[1]), json!("after"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let dispatcher = Dispatcher::new(config);
    dispatcher.send(&1u8);
    dispatcher.send(&2u8);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_listener_is_abandoned_after_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout_ms(100);
    let started = Instant::now();
    Dispatcher::new(config).send(&"slow");
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(3), "send took {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_are_spaced_by_the_pause() {
    let server = MockServer::start().await;
    mount_ok(&server, 3).await;

    let config = config_for(&server).with_pause_ms(60);
    let started = Instant::now();
    Dispatcher::new(config).send_all(&[&1u8, &2u8, &3u8]);
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(120), "send_all took {elapsed:?}");
}

#[tokio::test]
async fn test_send_from_current_thread_runtime() {
    let server = MockServer::start().await;
    mount_ok(&server, 2).await;

    let dispatcher = Dispatcher::new(config_for(&server));
    dispatcher.send(&"from async");
    dispatcher.send_all(&[]);
    dispatcher.send(&[1u8, 2]);
    drop(dispatcher);

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<Value> = requests.iter().map(body_json).collect();
    assert_eq!(bodies, vec![json!("from async"), json!([1, 2])]);
}

#[tokio::test]
async fn test_unreachable_endpoint_inside_runtime_does_not_panic() {
    let dispatcher = Dispatcher::new(
        DispatchConfig::new()
            .with_endpoint("http://127.0.0.1:1")
            .with_timeout_ms(100)
            .with_pause_ms(0),
    );
    dispatcher.send(&"nobody");
    tokio::task::yield_now().await;
    dispatcher.send_all(&[&"is", &"listening"]);
}

#[test]
fn test_unreachable_endpoint_does_not_panic() {
    let dispatcher = Dispatcher::new(
        DispatchConfig::new()
            .with_endpoint("http://127.0.0.1:1")
            .with_timeout_ms(100)
            .with_pause_ms(0),
    );
    dispatcher.send_all(&[&"nobody", &"is", &"listening"]);
}

// The only test touching the process-wide endpoint.
#[tokio::test(flavor = "multi_thread")]
async fn test_global_endpoint_and_macro() {
    let server = MockServer::start().await;
    mount_ok(&server, 3).await;

    assert_eq!(dbug::endpoint(), dbug::DEFAULT_ENDPOINT);
    dbug::set_endpoint(server.uri());
    assert_eq!(dbug::endpoint(), server.uri());

    dbug::send(&"single");
    dbug::dbug!("a", 2);

    let requests = server.received_requests().await.unwrap();
    let bodies: Vec<Value> = requests.iter().map(body_json).collect();
    assert_eq!(bodies, vec![json!("single"), json!("a"), json!(2)]);
}
