//! End-to-end tests driving the full router (auth middleware included)
//! against an in-memory SQLite database.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use loghub_api::config::{ApiKeyConfig, Config, CorsConfig, DatabaseConfig, ServerConfig};
use loghub_api::server::create_router;
use loghub_api::service::LogEventService;
use loghub_api::store::LogStore;

const API_KEY_HEADER: &str = "X-API-KEY";
const VALID_API_KEY: &str = "test-api-key";

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        api_keys: vec![ApiKeyConfig {
            key: VALID_API_KEY.to_string(),
            name: "test".to_string(),
            enabled: true,
        }],
        cors: CorsConfig::default(),
    }
}

async fn test_app() -> Router {
    // Single pooled connection so every request shares the in-memory database
    let store = LogStore::connect("sqlite::memory:", 1).await.unwrap();
    create_router(Arc::new(test_config()), LogEventService::new(store))
}

fn valid_event() -> Value {
    json!({
        "application": "test-app",
        "environment": "dev",
        "level": "ERROR",
        "message": "Test error message",
        "timestamp": "2024-05-01T12:00:00.000Z",
        "traceId": "trace-123",
        "metadata": {"userId": "user-456", "action": "login"},
        "sdk": {"language": "java", "version": "1.0.0"}
    })
}

fn post_logs(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/logs")
        .header(API_KEY_HEADER, VALID_API_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_logs(query: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(format!("/api/logs{query}"))
        .header(API_KEY_HEADER, VALID_API_KEY)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ingest_returns_created_with_projection() {
    let app = test_app().await;

    let response = app.oneshot(post_logs(&valid_event())).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["id"].is_i64());
    assert_eq!(body["application"], "test-app");
    assert_eq!(body["environment"], "dev");
    assert_eq!(body["level"], "ERROR");
    assert_eq!(body["message"], "Test error message");
    assert_eq!(body["traceId"], "trace-123");
    assert_eq!(body["metadata"]["userId"], "user-456");
    assert_eq!(body["metadata"]["action"], "login");
    assert_eq!(body["sdk"]["language"], "java");
    assert_eq!(body["sdk"]["version"], "1.0.0");
}

#[tokio::test]
async fn test_ingest_rejects_missing_fields_listing_all() {
    let app = test_app().await;

    let partial = json!({"application": "test-app", "environment": "dev"});
    let response = app.clone().oneshot(post_logs(&partial)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Validation Failed");
    assert_eq!(body["error"]["type"], "validation_error");

    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"message"));
    assert!(fields.contains(&"level"));
    assert!(fields.contains(&"timestamp"));

    // Nothing was persisted
    let response = app.oneshot(get_logs("")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn test_search_paginates_single_application() {
    let app = test_app().await;

    for i in 0..5 {
        let mut event = valid_event();
        event["timestamp"] = json!(format!("2024-05-01T12:00:0{i}.000Z"));
        let response = app.clone().oneshot(post_logs(&event)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(get_logs("?application=test-app&page=0&size=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 5);
    assert_eq!(body["page"], 0);
    assert_eq!(body["size"], 10);
    assert_eq!(body["totalElements"], 5);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_search_filters_by_level() {
    let app = test_app().await;

    let mut info_event = valid_event();
    info_event["level"] = json!("INFO");
    app.clone().oneshot(post_logs(&valid_event())).await.unwrap();
    app.clone().oneshot(post_logs(&info_event)).await.unwrap();

    let response = app.oneshot(get_logs("?level=ERROR")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["level"], "ERROR");
}

#[tokio::test]
async fn test_search_filters_by_application() {
    let app = test_app().await;

    let mut other = valid_event();
    other["application"] = json!("specific-app");
    other["environment"] = json!("prod");
    other["level"] = json!("WARN");
    app.clone().oneshot(post_logs(&valid_event())).await.unwrap();
    app.clone().oneshot(post_logs(&other)).await.unwrap();

    let response = app
        .oneshot(get_logs("?application=specific-app"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["application"], "specific-app");
}

#[tokio::test]
async fn test_search_orders_newest_first_across_pages() {
    let app = test_app().await;

    for i in 0..5 {
        let mut event = valid_event();
        event["timestamp"] = json!(format!("2024-05-01T12:00:0{i}.000Z"));
        app.clone().oneshot(post_logs(&event)).await.unwrap();
    }

    let mut seen = Vec::new();
    for page in 0..3 {
        let response = app
            .clone()
            .oneshot(get_logs(&format!("?page={page}&size=2")))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["totalElements"], 5);
        assert_eq!(body["totalPages"], 3);
        for item in body["content"].as_array().unwrap() {
            seen.push(item["timestamp"].as_str().unwrap().to_string());
        }
    }

    // Pages partition the full set and stay sorted descending overall
    assert_eq!(seen.len(), 5);
    let mut sorted = seen.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(seen, sorted);
}

#[tokio::test]
async fn test_search_time_range_is_inclusive() {
    let app = test_app().await;

    for i in 0..3 {
        let mut event = valid_event();
        event["timestamp"] = json!(format!("2024-05-01T12:00:0{i}.000Z"));
        app.clone().oneshot(post_logs(&event)).await.unwrap();
    }

    let response = app
        .oneshot(get_logs(
            "?from=2024-05-01T12:00:01.000Z&to=2024-05-01T12:00:02.000Z",
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["totalElements"], 2);
}

#[tokio::test]
async fn test_search_rejects_unknown_level() {
    let app = test_app().await;

    let response = app.oneshot(get_logs("?level=LOUD")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "invalid_parameter");
}

#[tokio::test]
async fn test_search_rejects_malformed_instant() {
    let app = test_app().await;

    let response = app.oneshot(get_logs("?from=yesterday")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_bad_paging() {
    let app = test_app().await;

    let response = app.clone().oneshot(get_logs("?size=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get_logs("?page=-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_rejects_malformed_body() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/logs")
        .header(API_KEY_HEADER, VALID_API_KEY)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_requires_key() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/logs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(valid_event().to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Missing API Key");

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/logs")
        .header(API_KEY_HEADER, "invalid-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid API Key");
}

#[tokio::test]
async fn test_health_and_root_need_no_key() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "UP");

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "LogHub API");
}
