use rstest::rstest;

use super::*;

#[rstest]
#[case(AppError::Unauthorized("test".into()), 401, "UNAUTHORIZED")]
#[case(AppError::Forbidden("test".into()), 403, "FORBIDDEN")]
#[case(AppError::NotFound("test".into()), 404, "NOT_FOUND")]
#[case(AppError::Validation("test".into()), 400, "VALIDATION_ERROR")]
#[case(AppError::InvalidState("test".into()), 400, "INVALID_STATE")]
#[case(AppError::Conflict("test".into()), 409, "CONFLICT")]
#[case(AppError::Database("test".into()), 500, "DATABASE_ERROR")]
#[case(AppError::Storage("test".into()), 500, "STORAGE_ERROR")]
#[case(AppError::ExternalService("test".into()), 502, "EXTERNAL_SERVICE_ERROR")]
#[case(AppError::Internal("test".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        AppError::Unauthorized("msg".into()).to_string(),
        "Authentication failed: msg"
    );
    assert_eq!(
        AppError::InvalidState("batch is not a draft".into()).to_string(),
        "Invalid state: batch is not a draft"
    );
    assert_eq!(
        AppError::Storage("bucket missing".into()).to_string(),
        "Storage error: bucket missing"
    );
}

#[test]
fn test_app_result_alias() {
    fn fails() -> AppResult<()> {
        Err(AppError::NotFound("application".into()))
    }

    let err = fails().unwrap_err();
    assert_eq!(err.status_code(), 404);
}
