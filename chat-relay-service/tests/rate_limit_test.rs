mod common;

use axum::http::StatusCode;
use chat_relay_service::config::RateLimitConfig;
use chat_relay_service::services::providers::mock::MockChatProvider;
use common::{
    body_json, post_chat, post_chat_from, router_with_config, test_config, TEST_PEER,
};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

#[tokio::test]
async fn excess_requests_are_rejected_before_the_handler() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        max_requests: 2,
        window_secs: 900,
        trust_forwarded: false,
    };

    let provider = Arc::new(MockChatProvider::replying("ok"));
    let app = router_with_config(config, provider.clone());
    let body = json!({"contentArray": [{"type": "text", "text": "hi"}]});

    for _ in 0..2 {
        let response = app.clone().oneshot(post_chat(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(post_chat(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(
        body_json(response).await,
        json!({"error": "Too many requests, please try again later."})
    );

    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn rotating_forwarded_for_does_not_reset_the_limit() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        max_requests: 2,
        window_secs: 900,
        trust_forwarded: false,
    };

    let provider = Arc::new(MockChatProvider::replying("ok"));
    let app = router_with_config(config, provider.clone());
    let body = json!({"contentArray": [{"type": "text", "text": "hi"}]});

    let mut statuses = Vec::new();
    for spoofed in ["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4"] {
        let response = app
            .clone()
            .oneshot(post_chat_from(TEST_PEER, Some(spoofed), &body))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(
        statuses,
        [
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn trusted_proxy_limits_each_forwarded_client() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        max_requests: 1,
        window_secs: 900,
        trust_forwarded: true,
    };

    let provider = Arc::new(MockChatProvider::replying("ok"));
    let app = router_with_config(config, provider.clone());
    let body = json!({"contentArray": [{"type": "text", "text": "hi"}]});
    let proxy = "10.0.0.5:443";

    let first = app
        .clone()
        .oneshot(post_chat_from(proxy, Some("198.51.100.1"), &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second_client = app
        .clone()
        .oneshot(post_chat_from(proxy, Some("198.51.100.2"), &body))
        .await
        .unwrap();
    assert_eq!(second_client.status(), StatusCode::OK);

    let repeat = app
        .oneshot(post_chat_from(proxy, Some("198.51.100.1"), &body))
        .await
        .unwrap();
    assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(provider.calls(), 2);
}
