#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{Request, Response},
    Router,
};
use chat_relay_service::config::{ModelConfig, RateLimitConfig, RelayConfig, UpstreamConfig};
use chat_relay_service::services::providers::mock::MockChatProvider;
use chat_relay_service::services::providers::ChatProvider;
use chat_relay_service::startup::Application;
use chat_relay_service::{build_router, AppState};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::net::SocketAddr;
use std::sync::Arc;

pub fn test_config() -> RelayConfig {
    RelayConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "error".to_string(),
        },
        upstream: UpstreamConfig {
            api_key: Secret::new("test-api-key".to_string()),
            base_url: "http://127.0.0.1:9/openai/v1".to_string(),
            timeout_secs: 5,
        },
        models: ModelConfig::default(),
        rate_limit: RateLimitConfig::default(),
        static_dir: "tests/fixtures/public".to_string(),
        otlp_endpoint: None,
    }
}

pub fn router_with(provider: Arc<dyn ChatProvider>) -> Router {
    build_router(AppState::new(test_config(), provider))
}

pub fn router_with_config(config: RelayConfig, provider: Arc<dyn ChatProvider>) -> Router {
    build_router(AppState::new(config, provider))
}

/// Peer address attached to router requests, standing in for the socket the
/// server would see.
pub const TEST_PEER: &str = "203.0.113.7:52000";

pub fn post_chat(body: &Value) -> Request<Body> {
    post_chat_from(TEST_PEER, None, body)
}

pub fn post_chat_from(peer: &str, forwarded_for: Option<&str>, body: &Value) -> Request<Body> {
    let peer: SocketAddr = peer.parse().expect("peer should be a socket address");
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .extension(ConnectInfo(peer));
    if let Some(forwarded_for) = forwarded_for {
        builder = builder.header("x-forwarded-for", forwarded_for);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub provider: Arc<MockChatProvider>,
}

impl TestApp {
    pub async fn spawn(provider: MockChatProvider) -> Self {
        let provider = Arc::new(provider);
        let app = Application::build_with_provider(test_config(), provider.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        wait_until_ready(&address).await;

        TestApp {
            address,
            port,
            provider,
        }
    }
}

/// Poll `/api/health` until the spawned server answers.
pub async fn wait_until_ready(address: &str) {
    let client = reqwest::Client::new();
    let health_url = format!("{}/api/health", address);
    for _ in 0..100 {
        if let Ok(response) = client.get(&health_url).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
    panic!("server at {} never became ready", address);
}
