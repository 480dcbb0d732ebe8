//! Router-level tests driving the full middleware stack without a socket.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::DateTime;
use serde_json::Value;
use tower::ServiceExt;

use k8s_web_app::error::ResultExt;
use k8s_web_app::routes::{build_app, routes};
use k8s_web_app::templates::init_templates;
use k8s_web_app::{create_router, AppError, AppState, ErrorResponse, Lifecycle, ServerConfig, ShutdownEvent};

fn test_state(vars: &[(&str, &str)]) -> AppState {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = ServerConfig::from_lookup(|key| map.get(key).cloned()).unwrap();
    let tera = init_templates(&config.template_glob()).unwrap();
    AppState::new(config, tera, Arc::new(Lifecycle::new()))
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body should be UTF-8")
    }
}

async fn send(app: Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

async fn get_path(app: Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri).await
}

async fn failing(State(state): State<AppState>) -> Result<&'static str, ErrorResponse> {
    Err::<&'static str, _>(AppError::Internal("connection pool exhausted".to_string()))
        .for_environment(&state.config)
}

async fn panicking() -> &'static str {
    panic!("renderer state corrupted")
}

fn app_with_failures(state: AppState) -> Router {
    let table = routes()
        .route("/boom", get(failing))
        .route("/panic", get(panicking));
    build_app(table, state)
}

#[tokio::test]
async fn test_health_defaults() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["version"], "1.0.0");
    assert!(body["uptime"].is_f64());
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    assert_eq!(response.headers[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn test_health_reflects_configuration() {
    let app = create_router(test_state(&[("APP_ENV", "staging"), ("APP_VERSION", "2.0.1")]));
    let body = get_path(app, "/health").await.json();
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["version"], "2.0.1");
}

#[tokio::test]
async fn test_health_is_never_cached() {
    let state = test_state(&[]);
    let app = create_router(state);

    let first = get_path(app.clone(), "/health").await.json();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = get_path(app, "/health").await.json();

    let t1 = DateTime::parse_from_rfc3339(first["timestamp"].as_str().unwrap()).unwrap();
    let t2 = DateTime::parse_from_rfc3339(second["timestamp"].as_str().unwrap()).unwrap();
    assert!(t1 <= t2);
    assert!(second["uptime"].as_f64().unwrap() > first["uptime"].as_f64().unwrap());
}

#[tokio::test]
async fn test_ready_while_running() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/ready").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ready");
    assert!(DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_not_ready_once_draining() {
    let state = test_state(&[]);
    state.lifecycle.begin_drain(ShutdownEvent::Terminate);
    let app = create_router(state);

    let response = get_path(app.clone(), "/ready").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["status"], "not_ready");

    // Liveness is unaffected by draining
    let response = get_path(app, "/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "healthy");
}

#[tokio::test]
async fn test_info_defaults() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/api/info").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Welcome to K8s Web App API");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["pod"]["name"], "unknown");
    assert_eq!(body["pod"]["namespace"], "default");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_info_reports_pod_identity() {
    let app = create_router(test_state(&[
        ("HOSTNAME", "web-5c8d7-x2k9q"),
        ("NAMESPACE", "storefront"),
    ]));
    let body = get_path(app, "/api/info").await.json();
    assert_eq!(body["pod"]["name"], "web-5c8d7-x2k9q");
    assert_eq!(body["pod"]["namespace"], "storefront");
}

#[tokio::test]
async fn test_index_page_renders() {
    let app = create_router(test_state(&[("PORT", "8088"), ("APP_VERSION", "3.1.4")]));
    let response = get_path(app, "/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let html = response.text();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("development"));
    assert!(html.contains("3.1.4"));
    assert!(html.contains("8088"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/does-not-exist").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let body = response.json();
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Route /does-not-exist not found");
}

#[tokio::test]
async fn test_404_echoes_query_string() {
    let app = create_router(test_state(&[]));
    let body = get_path(app, "/missing/page?x=1").await.json();
    assert_eq!(body["message"], "Route /missing/page?x=1 not found");
}

#[tokio::test]
async fn test_wrong_method_is_404() {
    let app = create_router(test_state(&[]));

    for (method, path) in [
        (Method::POST, "/health"),
        (Method::DELETE, "/ready"),
        (Method::PUT, "/api/info"),
        (Method::POST, "/"),
        (Method::POST, "/nowhere"),
    ] {
        let response = send(app.clone(), method.clone(), path).await;
        assert_eq!(
            response.status,
            StatusCode::NOT_FOUND,
            "{method} {path} should be 404"
        );
        assert_eq!(
            response.json()["message"],
            format!("Route {path} not found"),
        );
    }
}

#[tokio::test]
async fn test_static_file_served() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/robots.txt").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text().contains("User-agent"));
    assert_eq!(response.headers[header::CACHE_CONTROL], "public, max-age=86400");
}

#[tokio::test]
async fn test_handler_failure_detail_in_development() {
    let app = app_with_failures(test_state(&[("APP_ENV", "development")]));
    let response = get_path(app, "/boom").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "Internal error: connection pool exhausted");
}

#[tokio::test]
async fn test_handler_failure_redacted_in_production() {
    let app = app_with_failures(test_state(&[("APP_ENV", "production")]));
    let response = get_path(app, "/boom").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "Internal server error");
    assert!(!response.text().contains("connection pool"));
}

#[tokio::test]
async fn test_panic_is_converted_to_500() {
    let app = app_with_failures(test_state(&[("APP_ENV", "staging")]));
    let response = get_path(app, "/panic").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Something went wrong!");
    assert_eq!(body["message"], "renderer state corrupted");
}

#[tokio::test]
async fn test_panic_redacted_in_production() {
    let app = app_with_failures(test_state(&[("APP_ENV", "prod")]));
    let body = get_path(app, "/panic").await.json();
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_template_failure_is_normalized() {
    let config = ServerConfig::from_lookup(|_| None).unwrap();
    let mut tera = tera::Tera::default();
    tera.add_raw_template("index.html", "{{ no_such_value }}").unwrap();
    let state = AppState::new(config, tera, Arc::new(Lifecycle::new()));

    let response = get_path(create_router(state), "/").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Something went wrong!");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Template rendering error"));
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = create_router(test_state(&[]));
    let response = get_path(app, "/api/info").await;

    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(response.headers["referrer-policy"], "no-referrer");
    assert!(response.headers.contains_key("content-security-policy"));
    assert_eq!(
        response.headers["strict-transport-security"],
        "max-age=31536000; includeSubDomains"
    );
    assert_eq!(response.headers["origin-agent-cluster"], "?1");
    assert_eq!(response.headers["x-permitted-cross-domain-policies"], "none");
    assert_eq!(response.headers["x-download-options"], "noopen");
    assert_eq!(response.headers["x-xss-protection"], "0");

    let request_id = response.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = create_router(test_state(&[]));
    let request = Request::builder()
        .uri("/api/info")
        .header(header::ORIGIN, "https://dashboard.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
