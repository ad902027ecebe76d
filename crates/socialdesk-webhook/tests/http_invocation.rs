//! Invoker tests against a real HTTP server.

use serde_json::json;
use socialdesk_core::{EndpointConfig, Integration, InvocationError, InvocationResult};
use socialdesk_webhook::{InvokeOptions, WebhookInvoker};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn invoker() -> WebhookInvoker {
    WebhookInvoker::with_reqwest().expect("Failed to create HTTP client")
}

fn fast_options() -> InvokeOptions {
    InvokeOptions::webhook().with_retry_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn test_posts_json_with_metadata_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/ai"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer tok_live"))
        .and(header_exists("x-request-id"))
        .and(body_partial_json(json!({
            "prompt": "hello",
            "metadata": {"source": "socialdesk-crm", "version": "1.0"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"x": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = EndpointConfig::new(Integration::AiAgent, format!("{}/webhook/ai", server.uri()))
        .with_credential("tok_live");

    let result = invoker()
        .invoke(&endpoint, json!({"prompt": "hello"}), &InvokeOptions::agent())
        .await;

    assert_eq!(result, InvocationResult::success(json!({"x": 1}), 200));
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let endpoint = EndpointConfig::new(Integration::Analytics, format!("{}/webhook/analytics", server.uri()));
    let result = invoker().invoke(&endpoint, json!({}), &fast_options()).await;

    assert_eq!(result.status_code(), Some(500));
    assert_eq!(
        result.error(),
        Some(&InvocationError::Rejected { status: 500, body: "boom".into() })
    );
}

#[tokio::test]
async fn test_plain_text_success_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Workflow was started"))
        .mount(&server)
        .await;

    let endpoint = EndpointConfig::new(Integration::Reports, server.uri());
    let result = invoker()
        .invoke(&endpoint, json!({}), &fast_options().with_retries(1))
        .await;

    assert!(matches!(
        result.error(),
        Some(InvocationError::MalformedResponse { status: 200, .. })
    ));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let endpoint = EndpointConfig::new(Integration::AiAgent, server.uri()).with_credential("tok");
    let options = InvokeOptions::agent().with_timeout(Duration::from_millis(200));

    let started = std::time::Instant::now();
    let result = invoker().invoke(&endpoint, json!({}), &options).await;

    assert_eq!(result.status_code(), Some(408));
    assert!(result.error().unwrap().is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1
    let endpoint = EndpointConfig::new(Integration::Notifications, "http://127.0.0.1:1/webhook");
    let result = invoker()
        .invoke(&endpoint, json!({}), &fast_options().with_retries(2))
        .await;

    assert!(matches!(result.error(), Some(InvocationError::Transport(_))));
    assert_eq!(result.status_code(), None);
}
