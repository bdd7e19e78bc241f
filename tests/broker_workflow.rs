//! End-to-end tests for the broker workflow.
//!
//! A broker is bound on an ephemeral port and driven over real HTTP, with
//! wiremock servers standing in for subscribers.

use hookrelay::server::{Application, Broker, Receiver, ReceiverConfig, ServerConfig};
use hookrelay::{
    DeliveryClient, Dispatcher, Subscription, VerificationLevel, WebhookConfig, WebhookRegistry,
    WebhookSignature,
};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const DEMO_SECRET: [u8; 5] = [1, 2, 3, 4, 5];

fn localhost() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
}

/// Start a broker with the default configuration and return its base URL
async fn start_broker() -> String {
    let broker = Broker::new(&ServerConfig::default()).unwrap();
    let app = Application::bind(localhost(), broker).await.unwrap();
    let base = format!("http://{}", app.local_addr());
    app.spawn();
    base
}

async fn register(client: &reqwest::Client, base: &str, url: &str, event: &str) -> (u16, String) {
    let response = client
        .post(format!("{}/registration", base))
        .body(serde_json::json!({ "url": url, "event": event }).to_string())
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

async fn list_registrations(client: &reqwest::Client, base: &str) -> serde_json::Value {
    let body = client
        .get(format!("{}/registration", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    serde_json::from_str(&body).unwrap()
}

/// Poll until `server` has seen `count` requests or two seconds pass
async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<Request> {
    for _ in 0..40 {
        let received = server.received_requests().await.unwrap();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    server.received_requests().await.unwrap()
}

async fn signed_subscriber(signature: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-SIGNATURE", signature))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    server
}

// =============================================================================
// Register, list, trigger
// =============================================================================

#[tokio::test]
async fn test_register_list_and_trigger() {
    let base = start_broker().await;
    let client = reqwest::Client::new();
    let signature = WebhookSignature::new(DEMO_SECRET).sign(b"payload-A").unwrap();

    let first = signed_subscriber(&signature).await;
    let second = signed_subscriber(&signature).await;
    let first_url = format!("{}/hook", first.uri());
    let second_url = format!("{}/hook", second.uri());

    assert_eq!(
        register(&client, &base, &first_url, "ORDER_PLACED").await,
        (201, "0".to_string())
    );
    assert_eq!(
        register(&client, &base, &second_url, "ORDER_SHIPPED").await,
        (201, "1".to_string())
    );

    let listed = list_registrations(&client, &base).await;
    assert_eq!(
        listed,
        serde_json::json!([
            { "url": first_url, "event": "ORDER_PLACED" },
            { "url": second_url, "event": "ORDER_SHIPPED" }
        ])
    );

    let trigger = client
        .post(format!("{}/invocation", base))
        .body("payload-A")
        .send()
        .await
        .unwrap();
    assert_eq!(trigger.status(), 200);

    for (server, event) in [(&first, "ORDER_PLACED"), (&second, "ORDER_SHIPPED")] {
        let received = wait_for_requests(server, 1).await;
        assert_eq!(received.len(), 1);

        let delivery = &received[0];
        assert_eq!(
            delivery.headers.get("x-signature").unwrap().to_str().unwrap(),
            signature
        );
        assert_eq!(delivery.headers.get("x-event").unwrap().to_str().unwrap(), event);
        assert_eq!(
            String::from_utf8(delivery.body.clone()).unwrap(),
            format!("Event {} occurred. Payload: payload-A", event)
        );
    }
}

#[tokio::test]
async fn test_malformed_registration_is_rejected() {
    let base = start_broker().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/registration", base))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let listed = client
        .get(format!("{}/registration", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(listed, "[]");
}

// =============================================================================
// Concurrency and failure isolation
// =============================================================================

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_indices() {
    let base = start_broker().await;
    let client = reqwest::Client::new();

    let registrations = (0..20).map(|i| {
        let client = client.clone();
        let base = base.clone();
        async move {
            let url = format!("http://localhost:{}/hook", 9000 + i);
            register(&client, &base, &url, "BULK").await
        }
    });
    let results = futures::future::join_all(registrations).await;

    let mut indices: Vec<usize> = results
        .into_iter()
        .map(|(status, body)| {
            assert_eq!(status, 201);
            body.parse().unwrap()
        })
        .collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());

    let listed = list_registrations(&client, &base).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(20));
}

#[tokio::test]
async fn test_unreachable_subscriber_does_not_block_others() {
    let base = start_broker().await;
    let client = reqwest::Client::new();
    let signature = WebhookSignature::new(DEMO_SECRET).sign(b"payload-B").unwrap();
    let reachable = signed_subscriber(&signature).await;

    register(&client, &base, "http://127.0.0.1:1/hook", "LOST").await;
    register(&client, &base, &format!("{}/hook", reachable.uri()), "FOUND").await;

    let trigger = client
        .post(format!("{}/invocation", base))
        .body("payload-B")
        .send()
        .await
        .unwrap();
    assert_eq!(trigger.status(), 200);

    assert_eq!(wait_for_requests(&reachable, 1).await.len(), 1);
}

// =============================================================================
// Broker deliveries checked by the validating receiver
// =============================================================================

#[tokio::test]
async fn test_receiver_accepts_signed_deliveries() {
    let receiver = Receiver::new(&ReceiverConfig::new().level(VerificationLevel::Content)).unwrap();
    let app = Application::bind(localhost(), receiver).await.unwrap();
    let receiver_url = format!("http://{}/invoked/", app.local_addr());
    app.spawn();

    let registry = WebhookRegistry::new();
    registry.register(Subscription::new(receiver_url.clone(), "ORDER_PLACED"));

    let signed = Dispatcher::new(
        registry.clone(),
        DeliveryClient::new(WebhookConfig::default(), WebhookSignature::new(DEMO_SECRET)).unwrap(),
    );
    let reports = signed.dispatch("payload-A").join().await;
    assert_eq!(reports.len(), 1);
    let report = reports[0].as_ref().unwrap();
    assert_eq!(report.status, 200);
    assert_eq!(report.body, "Successfully invoked dummy web service.");

    // Same subscription, wrong secret: the receiver answers 400.
    let forged = Dispatcher::new(
        registry,
        DeliveryClient::new(WebhookConfig::default(), WebhookSignature::new("forged")).unwrap(),
    );
    let reports = forged.dispatch("payload-A").join().await;
    assert!(matches!(
        reports[0],
        Err(hookrelay::WebhookError::DeliveryStatus { status: 400, .. })
    ));
}
