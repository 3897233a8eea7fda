//! HTTP routes exercised in-process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use sommelier::api::{api_routes, ApiState};
use sommelier::providers::{LlmProvider, ProviderError};
use sommelier::recommend::RecommendationService;
use sommelier::sanitize::FALLBACK_FRAGMENT;

struct CannedProvider(Option<&'static str>);

#[async_trait]
impl LlmProvider for CannedProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.0
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::HttpStatus {
                status: 503,
                body: "no reply configured".to_owned(),
            })
    }

    fn model_id(&self) -> &str {
        "canned/model"
    }
}

fn state(reply: Option<&'static str>) -> ApiState {
    ApiState {
        service: Arc::new(RecommendationService::new(
            Arc::new(CannedProvider(reply)),
            Duration::from_secs(5),
        )),
    }
}

async fn post_wine(state: ApiState, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/wine")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");

    let response = api_routes(state)
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 65_536)
        .await
        .expect("body should be readable");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn client_body() -> Value {
    json!({
        "flavor": "Fruity",
        "type": "White",
        "occasion": "",
        "budget": "€15–30",
        "boldness": "Light",
        "country": "",
        "city": "",
        "extraPreferences": ""
    })
}

#[tokio::test]
async fn valid_profile_returns_recommendation() {
    let (status, body) = post_wine(state(Some("<h3>Test</h3><p>Body</p>")), client_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"recommendation": "<h3>Test</h3><p>Body</p>"}));
}

#[tokio::test]
async fn provider_failure_returns_fallback_with_ok_status() {
    let (status, body) = post_wine(state(None), client_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendation"], FALLBACK_FRAGMENT);
}

#[tokio::test]
async fn missing_required_field_is_bad_request() {
    let mut body = client_body();
    if let Some(map) = body.as_object_mut() {
        map.remove("boldness");
    }
    let (status, body) = post_wine(state(Some("<p>unused</p>")), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("Boldness"), "unexpected error: {message}");
}

#[tokio::test]
async fn unknown_option_is_bad_request() {
    let mut body = client_body();
    body["type"] = json!("Orange");
    let (status, body) = post_wine(state(Some("<p>unused</p>")), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/wine")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");
    let response = api_routes(state(Some("<p>unused</p>")))
        .oneshot(request)
        .await
        .expect("router is infallible");
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_reports_active_model() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request should build");
    let response = api_routes(state(None))
        .oneshot(request)
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("body should be readable");
    let body: Value = serde_json::from_slice(&bytes).expect("health body is JSON");
    assert_eq!(body, json!({"status": "ok", "model": "canned/model"}));
}
