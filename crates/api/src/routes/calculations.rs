//! Benefit calculation routes, for handlers only.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use benefit_core::calculator::CalculationUpdate;
use benefit_db::CalculationRepository;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the calculation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/applications/{id}/calculation",
        get(get_calculation).put(save_calculation),
    )
}

fn repository(state: &AppState) -> CalculationRepository {
    CalculationRepository::new(
        (*state.db).clone(),
        state.config.benefit.association_form_codes.clone(),
    )
}

/// GET `/applications/{id}/calculation`
///
/// Returns `null` while nothing has been calculated.
async fn get_calculation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let calculation = repository(&state).get(application_id).await?;
    Ok(Json(calculation))
}

/// PUT `/applications/{id}/calculation`
async fn save_calculation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(application_id): Path<Uuid>,
    Json(update): Json<CalculationUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_handler()?;
    let calculation = repository(&state)
        .save(application_id, auth.user_id(), &update)
        .await?;
    Ok(Json(calculation))
}
