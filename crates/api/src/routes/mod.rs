//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod applications;
pub mod attachments;
pub mod batches;
pub mod calculations;
pub mod case_system;
pub mod health;
pub mod payment_export;

#[cfg(test)]
mod tests;

/// Creates the API router. Handler and applicant routes sit behind the JWT
/// middleware; service routes check their own credentials.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(applications::routes())
        .merge(attachments::routes())
        .merge(calculations::routes())
        .merge(batches::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(payment_export::routes())
        .merge(case_system::routes())
        .merge(protected_routes)
}
