//! Credentials of machine clients: the payment robot and the case system.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{
        Authorization,
        authorization::{Basic, Bearer},
    },
};

use crate::{AppState, error::ApiError};

/// Passes when the request carries the payment robot's HTTP Basic credentials.
#[derive(Debug, Clone, Copy)]
pub struct PaymentRobot;

impl FromRequestParts<AppState> for PaymentRobot {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::unauthorized("MISSING_CREDENTIALS", "Basic credentials are required")
                })?;

        let expected = &state.config.payment_export;
        if expected.username.is_empty()
            || basic.username() != expected.username
            || basic.password() != expected.password
        {
            tracing::warn!(username = basic.username(), "payment export login failed");
            return Err(ApiError::unauthorized(
                "INVALID_CREDENTIALS",
                "Invalid username or password",
            ));
        }
        Ok(Self)
    }
}

/// Passes when the request carries the case system's callback token.
#[derive(Debug, Clone, Copy)]
pub struct CaseSystemAuth;

impl FromRequestParts<AppState> for CaseSystemAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::unauthorized(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token is required",
                    )
                })?;

        let expected = &state.config.case_system.callback_token;
        if expected.is_empty() || bearer.token() != expected {
            return Err(ApiError::unauthorized("INVALID_TOKEN", "Invalid token"));
        }
        Ok(Self)
    }
}
