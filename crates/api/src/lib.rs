//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for applicants, handlers, and service integrations
//! - Authentication middleware
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use benefit_core::storage::StorageService;
use benefit_shared::case_system::CaseSystemClient;
use benefit_shared::config::AppConfig;
use benefit_shared::email::EmailService;
use benefit_shared::jwt::JwtService;

pub use error::ApiError;

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT_OVERHEAD: u64 = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Status change notifications.
    pub email_service: Arc<EmailService>,
    /// Attachment storage.
    pub storage: Arc<StorageService>,
    /// Outbound case system client.
    pub case_system: Arc<CaseSystemClient>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.benefit.max_upload_size + BODY_LIMIT_OVERHEAD)
        .unwrap_or(usize::MAX);

    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
