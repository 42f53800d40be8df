//! Integration tests for the application repository.

mod common;

use benefit_core::application::{ApplicationError, ApplicationStatus};
use benefit_core::workflow::{Actor, WorkflowError};
use benefit_db::entities::sea_orm_active_enums::BatchStatus as DbBatchStatus;
use benefit_db::{ApplicationFilter, ApplicationRepository};
use benefit_shared::config::BenefitConfig;
use benefit_shared::types::PageRequest;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_copies_company_snapshot() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());

    let app = repo.create(company.id).await.expect("Failed to create");

    assert_eq!(app.status, ApplicationStatus::Draft);
    assert_eq!(app.company.name, company.name);
    assert_eq!(app.company.business_id, company.business_id);
    assert_eq!(
        app.fields.company_bank_account_number.as_deref(),
        Some("FI2112345600000785")
    );
    assert!(app.application_number >= 125_000);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_company_may_hold_several_drafts() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());

    let first = repo.create(company.id).await.expect("Failed to create");
    let second = repo.create(company.id).await.expect("Failed to create second draft");

    assert_ne!(first.id, second.id);
    assert_eq!(second.status, ApplicationStatus::Draft);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_for_unknown_company() {
    let db = common::setup().await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());

    let err = repo.create(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ApplicationError::CompanyNotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_other_company_can_not_see_application() {
    let db = common::setup().await;
    let owner = common::create_company(&db, 16).await;
    let other = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());

    let app = repo.create(owner.id).await.expect("Failed to create");

    assert!(repo.find(app.id, Some(owner.id)).await.is_ok());
    assert!(repo.find(app.id, None).await.is_ok());
    let err = repo.find(app.id, Some(other.id)).await.unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_is_scoped_to_company() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());

    repo.create(company.id).await.expect("Failed to create");
    repo.create(company.id).await.expect("Failed to create");

    let filter = ApplicationFilter {
        company_id: Some(company.id),
        ..ApplicationFilter::default()
    };
    let (apps, total) = repo
        .list(&filter, &PageRequest::default())
        .await
        .expect("Failed to list");

    assert_eq!(total, 2);
    assert!(apps.iter().all(|a| a.company_id == company.id));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_incomplete_draft_can_not_be_submitted() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());
    let app = repo.create(company.id).await.expect("Failed to create");

    let err = repo
        .change_status(
            app.id,
            Some(company.id),
            Actor::Applicant,
            ApplicationStatus::Received,
            None,
        )
        .await
        .unwrap_err();

    let WorkflowError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has("benefit_type"));
    let unchanged = repo.find(app.id, None).await.expect("Failed to find");
    assert_eq!(unchanged.status, ApplicationStatus::Draft);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_applicant_can_not_accept() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());
    let app = repo.create(company.id).await.expect("Failed to create");

    let err = repo
        .change_status(
            app.id,
            Some(company.id),
            Actor::Applicant,
            ApplicationStatus::Accepted,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_reopening_in_locked_batch_is_rejected() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let handler = common::create_handler(&db).await;
    let batch = common::create_batch(&db, DbBatchStatus::AwaitingDecision, handler).await;
    let app = repo.create(company.id).await.expect("Failed to create");
    common::accept_into_batch(&db, app.id, batch.id).await;

    let err = repo
        .change_status(app.id, None, Actor::Handler, ApplicationStatus::Handling, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::BatchLocked));
    assert_eq!(err.status_code(), 400);

    let unchanged = repo.find(app.id, None).await.expect("Failed to find");
    assert_eq!(unchanged.status, ApplicationStatus::Accepted);
    assert_eq!(unchanged.batch_id, Some(batch.id));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_reopening_in_returned_batch_detaches() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let handler = common::create_handler(&db).await;
    let batch = common::create_batch(&db, DbBatchStatus::Returned, handler).await;
    let app = repo.create(company.id).await.expect("Failed to create");
    common::accept_into_batch(&db, app.id, batch.id).await;

    let (reopened, _) = repo
        .change_status(app.id, None, Actor::Handler, ApplicationStatus::Handling, None)
        .await
        .expect("Failed to reopen");
    assert_eq!(reopened.status, ApplicationStatus::Handling);
    assert_eq!(reopened.batch_id, None);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_draft() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let repo = ApplicationRepository::new(db, BenefitConfig::default());
    let app = repo.create(company.id).await.expect("Failed to create");

    let purged = repo
        .delete_draft(app.id, Some(company.id))
        .await
        .expect("Failed to delete");
    assert!(purged.is_empty());

    let err = repo.find(app.id, None).await.unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}
