// ============================================================================
// Rate Limiting Tests
// ============================================================================
//
// Per-IP fixed-window throttling, applied to every route the gateway serves.
// Each test spawns its own gateway, so counters never bleed between tests.
//
// ============================================================================

use serde_json::{Value, json};
use std::time::Duration;

use test_utils::{spawn_gateway, spawn_upstream, test_config};

#[tokio::test]
async fn test_requests_within_budget_pass() {
    let upstream = spawn_upstream(200, "ok").await;
    let mut config = test_config(&upstream.base_url);
    config.rate_limit.max_requests = 3;
    let gateway = spawn_gateway(config).await;

    let client = reqwest::Client::new();
    for _ in 0..3 {
        let response = client.get(gateway.url("/health")).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }
}

#[tokio::test]
async fn test_request_over_budget_gets_429_with_static_body() {
    let upstream = spawn_upstream(200, "ok").await;
    let mut config = test_config(&upstream.base_url);
    config.rate_limit.max_requests = 3;
    let gateway = spawn_gateway(config).await;

    let client = reqwest::Client::new();
    for _ in 0..3 {
        client.get(gateway.url("/health")).send().await.unwrap();
    }

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "error": "RATE_LIMIT_EXCEEDED",
            "message": "Too many requests from this IP, please try again later."
        })
    );
}

#[tokio::test]
async fn test_budget_is_per_client_ip() {
    let upstream = spawn_upstream(200, "ok").await;
    let mut config = test_config(&upstream.base_url);
    config.rate_limit.max_requests = 2;
    let gateway = spawn_gateway(config).await;

    let client = reqwest::Client::new();

    // First caller exhausts its budget
    for _ in 0..2 {
        client
            .get(gateway.url("/health"))
            .header("x-forwarded-for", "10.0.0.1")
            .send()
            .await
            .unwrap();
    }
    let response = client
        .get(gateway.url("/health"))
        .header("x-forwarded-for", "10.0.0.1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

    // A different caller is unaffected
    let response = client
        .get(gateway.url("/health"))
        .header("x-forwarded-for", "10.0.0.2")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_budget_spans_all_routes() {
    let upstream = spawn_upstream(200, "ok").await;
    let mut config = test_config(&upstream.base_url);
    config.rate_limit.max_requests = 2;
    let gateway = spawn_gateway(config).await;

    let client = reqwest::Client::new();

    // One shared counter: mixing routes still burns the same budget
    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = client
        .get(gateway.url("/api/v1/startup/entities"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = client
        .get(gateway.url("/api/services"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_window_reset_restores_budget() {
    let upstream = spawn_upstream(200, "ok").await;
    let mut config = test_config(&upstream.base_url);
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_secs = 1;
    let gateway = spawn_gateway(config).await;

    let client = reqwest::Client::new();
    for _ in 0..2 {
        client.get(gateway.url("/health")).send().await.unwrap();
    }

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
