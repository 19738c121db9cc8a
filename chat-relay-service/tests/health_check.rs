//! HTTP-level tests against a spawned server.

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use chat_relay_service::services::providers::mock::MockChatProvider;
use common::{body_json, router_with, TestApp};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok_with_timestamp() {
    let app = TestApp::spawn(MockChatProvider::replying("unused")).await;
    let client = Client::new();

    for _ in 0..3 {
        let response = client
            .get(format!("{}/api/health", app.address))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert!(response.headers().contains_key("x-request-id"));

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "OK");
        let timestamp = body["timestamp"].as_str().expect("timestamp is a string");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn chat_round_trip_over_http() {
    let app = TestApp::spawn(MockChatProvider::replying("🧵 1/5 Here's a thread")).await;

    let response = Client::new()
        .post(format!("{}/api/chat", app.address))
        .json(&serde_json::json!({
            "contentArray": [{"type": "text", "text": "Draft a Twitter thread"}],
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello!"}]
        }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["content"], "🧵 1/5 Here's a thread");
    assert_eq!(body["intent"], "thread");
    assert_eq!(body["success"], true);
    assert_eq!(app.provider.last_request().unwrap().messages.len(), 4);
}

#[tokio::test]
async fn static_assets_are_served_from_public_dir() {
    let provider = Arc::new(MockChatProvider::replying("unused"));
    let response = router_with(provider)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("chat-root"));
}

#[tokio::test]
async fn health_check_via_router() {
    let provider = Arc::new(MockChatProvider::replying("unused"));
    let response = router_with(provider)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "OK");
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let provider = Arc::new(MockChatProvider::replying("unused"));
    let response = router_with(provider)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
