//! Benefit API server
//!
//! Main entry point for the benefit administration backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use benefit_api::{AppState, create_router};
use benefit_core::storage::StorageService;
use benefit_db::connect_with;
use benefit_shared::AppConfig;
use benefit_shared::case_system::CaseSystemClient;
use benefit_shared::email::EmailService;
use benefit_shared::jwt::JwtService;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "benefit=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let storage = StorageService::from_settings(&config.storage)
        .context("Failed to configure attachment storage")?;
    info!(provider = storage.provider_name(), "Attachment storage configured");

    let case_system =
        CaseSystemClient::new(&config.case_system).context("Failed to build case system client")?;

    let email_service = EmailService::new(config.email.clone());
    info!(
        enabled = config.email.enabled,
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(&config.jwt)),
        email_service: Arc::new(email_service),
        storage: Arc::new(storage),
        case_system: Arc::new(case_system),
        config: Arc::new(config),
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
