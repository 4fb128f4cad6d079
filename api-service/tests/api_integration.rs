//! API integration tests.
//!
//! Drives the full router (middleware included) against a scripted backend.

use std::sync::{Arc, Mutex};

use api_service::{create_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::config::AppConfig;
use common::db::{ConnectionProvider, Handle, Predicate, Record, TableBackend, TableRequest};
use common::errors::{AppError, AppResult};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

/// Backend answering every request with the same scripted outcome.
#[derive(Default)]
struct ScriptedBackend {
    requests: Mutex<Vec<TableRequest>>,
    rows: Mutex<Vec<Record>>,
    upstream_status: Mutex<Option<u16>>,
}

impl ScriptedBackend {
    fn returning(rows: Value) -> Arc<Self> {
        let backend = Self::default();
        *backend.rows.lock().unwrap() = serde_json::from_value(rows).unwrap();
        Arc::new(backend)
    }

    fn failing(status: u16) -> Arc<Self> {
        let backend = Self::default();
        *backend.upstream_status.lock().unwrap() = Some(status);
        Arc::new(backend)
    }

    fn requests(&self) -> Vec<TableRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TableBackend for ScriptedBackend {
    async fn execute(&self, request: TableRequest) -> AppResult<Vec<Record>> {
        self.requests.lock().unwrap().push(request);
        if let Some(status) = *self.upstream_status.lock().unwrap() {
            return Err(AppError::ExternalService {
                status: Some(status),
                code: Some("23505".to_string()),
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

fn configured() -> AppConfig {
    AppConfig {
        supabase_url: Some("https://demo.supabase.co".to_string()),
        supabase_key: Some("service-key".to_string()),
        ..AppConfig::default()
    }
}

fn app_with(backend: Arc<ScriptedBackend>) -> Router {
    let config = configured();
    let provider = ConnectionProvider::with_factory(&config, move |_| Ok(backend.clone() as Handle));
    create_router(AppState::with_provider(provider))
}

fn unconfigured_app() -> Router {
    create_router(AppState::new(&AppConfig::default()))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// =============================================================================
// Service Info & Health
// =============================================================================

#[tokio::test]
async fn test_root_returns_service_identity() {
    let (status, body) = send(unconfigured_app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "96sooq Backend API", "version": "1.0.0"}));
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(unconfigured_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "api-service");
}

#[tokio::test]
async fn test_database_health_unconfigured() {
    let (status, body) = send(unconfigured_app(), Method::GET, "/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unconfigured");
    assert_eq!(body["configured"], false);
}

#[tokio::test]
async fn test_database_health_probes_users_table() {
    let backend = ScriptedBackend::returning(json!([{"id": "1"}]));
    let (status, body) = send(app_with(backend.clone()), Method::GET, "/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    match &backend.requests()[0] {
        TableRequest::Select { table, query } => {
            assert_eq!(table, "users");
            assert_eq!(query.limit, Some(1));
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[tokio::test]
async fn test_database_health_reports_upstream_failure() {
    let (status, body) = send(app_with(ScriptedBackend::failing(500)), Method::GET, "/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].as_str().unwrap().contains("duplicate key"));
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, body) = send(unconfigured_app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/users/{id}"].is_object());
}

// =============================================================================
// Users API
// =============================================================================

#[tokio::test]
async fn test_create_user() {
    let backend = ScriptedBackend::returning(json!([{"id": "1", "name": "Ada"}]));
    let (status, body) = send(
        app_with(backend.clone()),
        Method::POST,
        "/api/users",
        Some(json!({"name": "Ada"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!({"id": "1", "name": "Ada"}));

    match &backend.requests()[0] {
        TableRequest::Insert { table, rows } => {
            assert_eq!(table, "users");
            assert_eq!(Value::Object(rows[0].clone()), json!({"name": "Ada"}));
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_user_validation_error() {
    let backend = ScriptedBackend::returning(json!([]));
    let (status, body) = send(
        app_with(backend.clone()),
        Method::POST,
        "/api/users",
        Some(json!({"name": "", "email": "nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_create_user_conflict() {
    let (status, body) = send(
        app_with(ScriptedBackend::failing(409)),
        Method::POST,
        "/api/users",
        Some(json!({"name": "Ada", "email": "ada@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["upstream_code"], "23505");
}

#[tokio::test]
async fn test_unconfigured_database_is_service_unavailable() {
    let (status, body) = send(
        unconfigured_app(),
        Method::POST,
        "/api/users",
        Some(json!({"name": "Ada"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
}

#[tokio::test]
async fn test_get_missing_user_is_not_found() {
    let (status, body) = send(
        app_with(ScriptedBackend::returning(json!([]))),
        Method::GET,
        "/api/users/missing-id",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_user_accepts_numeric_id() {
    let backend = ScriptedBackend::returning(json!([{"id": 5, "name": "Ada"}]));
    let (status, body) = send(app_with(backend), Method::GET, "/api/users/5", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "5");
}

#[tokio::test]
async fn test_list_users_translates_query_parameters() {
    let backend = ScriptedBackend::returning(json!([
        {"id": "1", "name": "Ada", "email": "ada@example.com"}
    ]));
    let (status, body) = send(
        app_with(backend.clone()),
        Method::GET,
        "/api/users?email=ada@example.com&order_by=name&desc=true&limit=5",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    match &backend.requests()[0] {
        TableRequest::Select { table, query } => {
            assert_eq!(table, "users");
            assert_eq!(query.limit, Some(5));
            assert_eq!(query.predicates, vec![Predicate::eq("email", "ada@example.com")]);
            assert_eq!(
                query.to_query_pairs().last().unwrap(),
                &("limit".to_string(), "5".to_string())
            );
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_users_rejects_bad_limit() {
    let (status, _) = send(
        app_with(ScriptedBackend::returning(json!([]))),
        Method::GET,
        "/api/users?limit=5000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_users_rejects_unknown_sort_column() {
    let backend = ScriptedBackend::returning(json!([]));
    let (status, body) = send(
        app_with(backend.clone()),
        Method::GET,
        "/api/users?order_by=email.nullsfirst,name&desc=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_update_user() {
    let backend = ScriptedBackend::returning(json!([{"id": "7", "name": "Grace"}]));
    let (status, body) = send(
        app_with(backend.clone()),
        Method::PATCH,
        "/api/users/7",
        Some(json!({"name": "Grace"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Grace");
    match &backend.requests()[0] {
        TableRequest::Update { predicates, values, .. } => {
            assert_eq!(predicates, &vec![Predicate::eq("id", "7")]);
            assert_eq!(Value::Object(values.clone()), json!({"name": "Grace"}));
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_with_empty_body_is_rejected() {
    let (status, _) = send(
        app_with(ScriptedBackend::returning(json!([]))),
        Method::PATCH,
        "/api/users/7",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_user() {
    let (status, body) = send(
        app_with(ScriptedBackend::returning(json!([{"id": "1"}]))),
        Method::DELETE,
        "/api/users/1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, _) = send(
        app_with(ScriptedBackend::returning(json!([]))),
        Method::DELETE,
        "/api/users/already-gone-id",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = app_with(ScriptedBackend::returning(json!([{"id": "1", "name": "Ada"}])));
    let request = Request::builder()
        .uri("/api/users/1")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["meta"]["request_id"], "req-123");
}

#[tokio::test]
async fn test_cors_is_fully_permissive() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users")
        .header(header::ORIGIN, "https://shop.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-custom-header")
        .body(Body::empty())
        .unwrap();

    let response = unconfigured_app().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://shop.example");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
