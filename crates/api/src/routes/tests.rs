//! Router tests for paths that are decided before the database is touched.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use benefit_core::storage::StorageService;
use benefit_shared::Role;
use benefit_shared::case_system::CaseSystemClient;
use benefit_shared::config::{
    AppConfig, BenefitConfig, CaseSystemConfig, DatabaseConfig, EmailConfig, JwtConfig,
    PaymentExportConfig, ServerConfig, StorageSettings,
};
use benefit_shared::email::EmailService;
use benefit_shared::jwt::JwtService;

use crate::{AppState, create_router};

const CALLBACK_TOKEN: &str = "callback-secret";

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret-key-that-is-long-enough".into(),
            access_token_expires_minutes: 5,
        },
        email: EmailConfig::default(),
        storage: StorageSettings::default(),
        case_system: CaseSystemConfig {
            callback_token: CALLBACK_TOKEN.into(),
            ..CaseSystemConfig::default()
        },
        payment_export: PaymentExportConfig {
            username: "robot".into(),
            password: "hunter2".into(),
        },
        benefit: BenefitConfig::default(),
    }
}

fn test_app() -> (Router, Arc<JwtService>) {
    let config = test_config();
    let jwt = Arc::new(JwtService::new(&config.jwt));
    let state = AppState {
        db: Arc::new(DatabaseConnection::Disconnected),
        jwt_service: jwt.clone(),
        email_service: Arc::new(EmailService::new(config.email.clone())),
        storage: Arc::new(StorageService::in_memory().unwrap()),
        case_system: Arc::new(CaseSystemClient::new(&config.case_system).unwrap()),
        config: Arc::new(config),
    };
    (create_router(state), jwt)
}

fn token(jwt: &JwtService, role: Role) -> String {
    let company = (role == Role::Applicant).then(Uuid::new_v4);
    jwt.generate_access_token(Uuid::new_v4(), company, role)
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, authorization: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = send(app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_db_health_without_database() {
    let (app, _) = test_app();
    let (status, body) = send(app, get("/health/db", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_missing_token() {
    let (app, _) = test_app();
    let (status, body) = send(app, get("/api/v1/applications", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_invalid_token() {
    let (app, _) = test_app();
    let (status, body) = send(app, get("/api/v1/applications", Some("Bearer nope"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_applicant_can_not_list_batches() {
    let (app, jwt) = test_app();
    let bearer = format!("Bearer {}", token(&jwt, Role::Applicant));
    let (status, body) = send(app, get("/api/v1/batches", Some(&bearer))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_applicant_can_not_read_calculation() {
    let (app, jwt) = test_app();
    let bearer = format!("Bearer {}", token(&jwt, Role::Applicant));
    let uri = format!("/api/v1/applications/{}/calculation", Uuid::new_v4());
    let (status, _) = send(app, get(&uri, Some(&bearer))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_handler_can_not_create_application() {
    let (app, jwt) = test_app();
    let bearer = format!("Bearer {}", token(&jwt, Role::Handler));
    let request = json_request("POST", "/api/v1/applications", &bearer, "{}");
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_payment_export_requires_basic_auth() {
    let (app, _) = test_app();
    let (status, body) = send(app, get("/api/v1/payment-export", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "MISSING_CREDENTIALS");
}

#[tokio::test]
async fn test_payment_export_rejects_wrong_password() {
    let (app, _) = test_app();
    // robot:wrong
    let (status, body) = send(
        app,
        get("/api/v1/payment-export", Some("Basic cm9ib3Q6d3Jvbmc=")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_callback_requires_token() {
    let (app, _) = test_app();
    let uri = format!("/api/v1/case-system/callback/{}", Uuid::new_v4());
    let request = json_request("POST", &uri, "Bearer wrong", r#"{"message":"Success"}"#);
    let (status, _) = send(app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

const REQUEST_ID: &str = "6f1c2b9e-3f55-4a8e-9d8e-2f1d7c1e0a11";
const CASE_GUID: &str = "0b7d6a52-8c1e-4f0a-9a7b-3d2e1f0c9b88";

fn callback_body(
    message: &str,
    request_id: Option<&str>,
    case_id: Option<&str>,
    case_guid: Option<&str>,
) -> String {
    let mut body = serde_json::Map::new();
    body.insert("message".into(), Value::from(message));
    if let Some(value) = request_id {
        body.insert("requestId".into(), Value::from(value));
    }
    if let Some(value) = case_id {
        body.insert("caseId".into(), Value::from(value));
    }
    if let Some(value) = case_guid {
        body.insert("caseGuid".into(), Value::from(value));
    }
    Value::Object(body).to_string()
}

async fn post_callback(body: String) -> (StatusCode, Value) {
    let (app, _) = test_app();
    let uri = format!("/api/v1/case-system/callback/{}", Uuid::new_v4());
    let bearer = format!("Bearer {CALLBACK_TOKEN}");
    send(app, json_request("POST", &uri, &bearer, &body)).await
}

#[rstest]
#[case::unknown_message(callback_body("Maybe", Some(REQUEST_ID), Some("HEL 2024-1"), Some(CASE_GUID)))]
#[case::missing_request_id(callback_body("Success", None, Some("HEL 2024-1"), Some(CASE_GUID)))]
#[case::missing_case_guid(callback_body("Success", Some(REQUEST_ID), Some("HEL 2024-1"), None))]
#[case::missing_case_id(callback_body("Success", Some(REQUEST_ID), None, Some(CASE_GUID)))]
#[case::failure_without_request_id(callback_body("Failure", None, Some("HEL 2024-1"), Some(CASE_GUID)))]
#[case::bad_guid(callback_body("Success", Some(REQUEST_ID), Some("HEL 2024-1"), Some("not-a-guid")))]
#[tokio::test]
async fn test_callback_rejects_invalid_body(#[case] body: String) {
    let (status, body) = post_callback(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_callback_failure_is_acknowledged() {
    let body = callback_body("Failure", Some(REQUEST_ID), Some("HEL 2024-1"), Some(CASE_GUID));
    let (status, body) = post_callback(body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Callback received but unsuccessful");
}

#[tokio::test]
async fn test_callback_success_needs_non_blank_case_id() {
    let body = callback_body("Success", Some(REQUEST_ID), Some("  "), Some(CASE_GUID));
    let (status, _) = post_callback(body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
