//! HTTP surface: health report shape, auth on the reset endpoint.

mod common;

use ai_gateway::api;
use ai_gateway::config::MonitoringConfig;
use ai_gateway::health::SystemHealthAggregator;
use ai_gateway::resilience::CircuitState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{registry, test_config, ScriptedProvider};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn app(names: &[&str]) -> (Router, Arc<ai_gateway::provider::ProviderRegistry>) {
    let providers: Vec<_> = names.iter().map(|n| ScriptedProvider::always_ok(n)).collect();
    let config = test_config(names);
    let registry = registry(&providers, &config);
    let aggregator = Arc::new(SystemHealthAggregator::new(registry.clone()));
    let monitoring = MonitoringConfig {
        report_endpoint: None,
        api_key: "test-key".to_string(),
    };
    (api::router(aggregator, &monitoring), registry)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_wire_shape() {
    let (app, registry) = app(&["a", "b"]);
    let breaker = registry.get("b").unwrap().breaker();
    for _ in 0..3 {
        breaker.record_failure();
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let response = app
        .oneshot(Request::builder().uri("/ai/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["healthyProviders"], 1);
    assert_eq!(json["totalProviders"], 2);
    assert_eq!(json["providersHealth"][0]["name"], "a");
    assert_eq!(json["providersHealth"][0]["circuitState"], "CLOSED");
    assert_eq!(json["providersHealth"][1]["circuitState"], "OPEN");
    assert_eq!(json["providersHealth"][1]["available"], false);
}

#[tokio::test]
async fn reset_requires_bearer_token() {
    let (app, registry) = app(&["a"]);
    let breaker = registry.get("a").unwrap().breaker();
    for _ in 0..3 {
        breaker.record_failure();
    }

    // Missing and wrong tokens are rejected; state is untouched.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ai/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ai/reset")
                .header("Authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(breaker.state(), CircuitState::Open);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ai/reset")
                .header("Authorization", "Bearer test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(breaker.state(), CircuitState::Closed);
}
