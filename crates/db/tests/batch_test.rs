//! Integration tests for batches, calculations, and case-system callbacks.

mod common;

use benefit_core::application::{ApplicationError, ApplicationStatus};
use benefit_core::batch::{BatchError, BatchStatus, DecisionFields};
use benefit_core::calculator::{CalculationError, CalculationUpdate};
use benefit_db::{
    ApplicationRepository, BatchRepository, CalculationRepository, CaseSystemRepository,
    OpenedCase,
};
use benefit_db::entities::sea_orm_active_enums::BatchStatus as DbBatchStatus;
use benefit_shared::config::BenefitConfig;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_draft_application_can_not_join_batch() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let apps = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let batches = BatchRepository::new(db.clone(), vec![29]);
    let app = apps.create(company.id).await.expect("Failed to create");
    let handler = common::create_handler(&db).await;

    let err = batches
        .assign_applications(ApplicationStatus::Accepted, &[app.id], handler)
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::InvalidApplicationStatus));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_assign_requires_decided_status() {
    let db = common::setup().await;
    let batches = BatchRepository::new(db, vec![29]);

    let err = batches
        .assign_applications(ApplicationStatus::Handling, &[Uuid::new_v4()], Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deassign_keeps_batch_until_empty() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let apps = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let batches = BatchRepository::new(db.clone(), vec![29]);
    let handler = common::create_handler(&db).await;
    let batch = common::create_batch(&db, DbBatchStatus::Returned, handler).await;
    let first = apps.create(company.id).await.expect("Failed to create");
    let second = apps.create(company.id).await.expect("Failed to create");
    common::accept_into_batch(&db, first.id, batch.id).await;
    common::accept_into_batch(&db, second.id, batch.id).await;

    let remaining = batches
        .deassign_applications(batch.id, &[first.id])
        .await
        .expect("Failed to deassign");
    assert_eq!(remaining, vec![second.id]);
    assert!(batches.get(batch.id).await.is_ok());

    let remaining = batches
        .deassign_applications(batch.id, &[second.id])
        .await
        .expect("Failed to deassign");
    assert!(remaining.is_empty());
    let err = batches.get(batch.id).await.unwrap_err();
    assert!(matches!(err, BatchError::NotFound(_)));
    let detached = apps.find(second.id, None).await.expect("Failed to find");
    assert_eq!(detached.batch_id, None);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deassign_of_non_member_is_not_found() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let apps = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let batches = BatchRepository::new(db.clone(), vec![29]);
    let handler = common::create_handler(&db).await;
    let batch = common::create_batch(&db, DbBatchStatus::Returned, handler).await;
    let member = apps.create(company.id).await.expect("Failed to create");
    common::accept_into_batch(&db, member.id, batch.id).await;
    let outsider = apps.create(company.id).await.expect("Failed to create");

    let err = batches
        .deassign_applications(batch.id, &[outsider.id])
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::NothingToDetach));
    assert_eq!(err.status_code(), 404);
    assert!(batches.get(batch.id).await.is_ok());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_batch() {
    let db = common::setup().await;
    let batches = BatchRepository::new(db, vec![29]);

    let err = batches
        .change_status(Uuid::new_v4(), BatchStatus::AwaitingDecision, &DecisionFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_calculation_of_unknown_application() {
    let db = common::setup().await;
    let repo = CalculationRepository::new(db, vec![29]);

    let err = repo.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CalculationError::ApplicationNotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_calculation_needs_benefit_type() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let apps = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let repo = CalculationRepository::new(db, vec![29]);
    let app = apps.create(company.id).await.expect("Failed to create");

    assert!(repo.get(app.id).await.expect("Failed to read").is_none());

    let err = repo
        .save(app.id, Uuid::new_v4(), &CalculationUpdate::default())
        .await
        .unwrap_err();
    // Drafts are not editable by handlers.
    assert!(matches!(err, CalculationError::NotEditable(ApplicationStatus::Draft)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_callback_sets_case_identifiers() {
    let db = common::setup().await;
    let company = common::create_company(&db, 16).await;
    let apps = ApplicationRepository::new(db.clone(), BenefitConfig::default());
    let repo = CaseSystemRepository::new(db);
    let app = apps.create(company.id).await.expect("Failed to create");
    let request_id = Uuid::new_v4();

    repo.record_request_sent(app.id, request_id)
        .await
        .expect("Failed to record request");
    repo.apply_callback(
        app.id,
        &OpenedCase {
            request_id,
            case_id: "HEL 2026-000123".to_string(),
            case_guid: Uuid::new_v4(),
        },
    )
    .await
    .expect("Failed to apply callback");

    let updated = apps.find(app.id, None).await.expect("Failed to find");
    assert_eq!(updated.case_id.as_deref(), Some("HEL 2026-000123"));
    assert!(updated.case_guid.is_some());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_callback_for_unknown_application() {
    let db = common::setup().await;
    let repo = CaseSystemRepository::new(db);

    let err = repo
        .apply_callback(
            Uuid::new_v4(),
            &OpenedCase {
                request_id: Uuid::new_v4(),
                case_id: "HEL 2026-000124".to_string(),
                case_guid: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}
