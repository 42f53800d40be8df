//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use benefit_core::workflow::Actor;
use benefit_shared::Claims;
use benefit_shared::jwt::JwtError;

use crate::{AppState, error::ApiError};

/// Extracts the bearer token from the Authorization header.
pub(crate) fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Validates the JWT bearer token and stores its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => {
            ApiError::unauthorized("TOKEN_EXPIRED", "Token has expired").into_response()
        }
        Err(_) => {
            ApiError::unauthorized("INVALID_TOKEN", "Invalid or malformed token").into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id()
    }

    /// Who is acting, for workflow checks.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::from(self.0.role)
    }

    /// Company filter for data access: `None` for handlers, who see every
    /// company, and the token's company for applicants.
    pub fn company_scope(&self) -> Result<Option<Uuid>, ApiError> {
        if self.0.is_handler() {
            return Ok(None);
        }
        self.0
            .company_id()
            .map(Some)
            .ok_or_else(|| ApiError::forbidden("Applicant token has no company"))
    }

    /// Fails unless the caller is a handler.
    pub fn require_handler(&self) -> Result<(), ApiError> {
        if self.0.is_handler() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Only handlers can do this"))
        }
    }

    /// Fails unless the caller is an applicant, returning their company.
    pub fn require_applicant(&self) -> Result<Uuid, ApiError> {
        if self.0.is_handler() {
            return Err(ApiError::forbidden("Only applicants can do this"));
        }
        self.0
            .company_id()
            .ok_or_else(|| ApiError::forbidden("Applicant token has no company"))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("UNAUTHORIZED", "Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use benefit_shared::Role;
    use chrono::{Duration, Utc};

    use super::*;

    fn user(role: Role, company: Option<Uuid>) -> AuthUser {
        AuthUser(Claims::new(
            Uuid::new_v4(),
            company,
            role,
            Utc::now() + Duration::minutes(5),
        ))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_handler_sees_all_companies() {
        let handler = user(Role::Handler, None);
        assert_eq!(handler.company_scope().unwrap(), None);
        assert!(handler.require_handler().is_ok());
        assert!(handler.require_applicant().is_err());
        assert_eq!(handler.actor(), Actor::Handler);
    }

    #[test]
    fn test_applicant_is_scoped_to_company() {
        let company = Uuid::new_v4();
        let applicant = user(Role::Applicant, Some(company));
        assert_eq!(applicant.company_scope().unwrap(), Some(company));
        assert_eq!(applicant.require_applicant().unwrap(), company);
        assert_eq!(
            applicant.require_handler().unwrap_err().status(),
            axum::http::StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_applicant_without_company_is_rejected() {
        let applicant = user(Role::Applicant, None);
        assert!(applicant.company_scope().is_err());
    }
}
