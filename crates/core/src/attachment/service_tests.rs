use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use super::*;
use crate::application::{
    Address, ApplicationFields, ApplicationStatus, BenefitType, CompanySnapshot, OrganizationType,
};
use crate::attachment::AttachmentType;

const PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

/// Mock repository for testing.
struct MockAttachmentRepository {
    application: Mutex<Application>,
    attachments: Mutex<HashMap<Uuid, Attachment>>,
}

impl MockAttachmentRepository {
    fn new(status: ApplicationStatus) -> Self {
        let application = Application {
            id: Uuid::new_v4(),
            application_number: 125_000,
            status,
            company_id: Uuid::new_v4(),
            company: CompanySnapshot {
                name: "Testi Oy".into(),
                business_id: "0877830-0".into(),
                company_form_code: 16,
                address: Address {
                    street_address: "Aleksanterinkatu 1".into(),
                    postcode: "00100".into(),
                    city: "Helsinki".into(),
                },
            },
            organization_type: OrganizationType::Company,
            fields: ApplicationFields {
                benefit_type: Some(BenefitType::Salary),
                ..ApplicationFields::default()
            },
            handler_id: None,
            batch_id: None,
            archived: false,
            calculated_benefit_amount: None,
            manual_benefit_amount: None,
            case_id: None,
            case_guid: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        };
        Self {
            application: Mutex::new(application),
            attachments: Mutex::new(HashMap::new()),
        }
    }

    fn application_id(&self) -> Uuid {
        self.application.lock().unwrap().id
    }
}

impl AttachmentRepository for MockAttachmentRepository {
    async fn find_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, AttachmentError> {
        let app = self.application.lock().unwrap();
        Ok((app.id == application_id).then(|| app.clone()))
    }

    async fn count_by_application(&self, application_id: Uuid) -> Result<u64, AttachmentError> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.application_id == application_id)
            .count() as u64)
    }

    async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, AttachmentError> {
        let attachment = Attachment {
            id: input.id,
            application_id: input.application_id,
            attachment_type: input.attachment_type,
            file_name: input.file_name,
            content_type: input.content_type,
            file_size: input.file_size,
            storage_key: input.storage_key,
            created_at: Utc::now(),
        };
        self.attachments
            .lock()
            .unwrap()
            .insert(attachment.id, attachment.clone());
        Ok(attachment)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        application_id: Uuid,
    ) -> Result<Option<Attachment>, AttachmentError> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .get(&id)
            .filter(|a| a.application_id == application_id)
            .cloned())
    }

    async fn list_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<Attachment>, AttachmentError> {
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.application_id == application_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid, _application_id: Uuid) -> Result<bool, AttachmentError> {
        Ok(self.attachments.lock().unwrap().remove(&id).is_some())
    }
}

type Fixture = (
    AttachmentService<MockAttachmentRepository>,
    Arc<MockAttachmentRepository>,
    Arc<StorageService>,
);

fn service(status: ApplicationStatus) -> Fixture {
    let storage = Arc::new(StorageService::in_memory().unwrap());
    let repo = Arc::new(MockAttachmentRepository::new(status));
    let service = AttachmentService::new(Arc::clone(&storage), Arc::clone(&repo), 1024);
    (service, repo, storage)
}

fn upload(application_id: Uuid, content: &'static [u8], content_type: &str) -> UploadInput {
    UploadInput {
        application_id,
        attachment_type: AttachmentType::EmploymentContract,
        file_name: "työsopimus.pdf".into(),
        content_type: content_type.into(),
        content: Bytes::from_static(content),
        actor: Actor::Applicant,
    }
}

#[tokio::test]
async fn test_upload_stores_file_and_record() {
    let (service, repo, storage) = service(ApplicationStatus::Draft);
    let app_id = repo.application_id();

    let attachment = service
        .upload(upload(app_id, PDF, "application/pdf"))
        .await
        .unwrap();

    assert_eq!(attachment.application_id, app_id);
    assert_eq!(attachment.file_size, PDF.len() as i64);
    assert!(attachment.storage_key.starts_with(&format!("applications/{app_id}/")));
    assert!(storage.exists(&attachment.storage_key).await.unwrap());

    let (found, content) = service.download(attachment.id, app_id).await.unwrap();
    assert_eq!(found.id, attachment.id);
    assert_eq!(&content[..], PDF);
}

#[tokio::test]
async fn test_upload_rejects_mismatched_content() {
    let (service, repo, _) = service(ApplicationStatus::Draft);

    let err = service
        .upload(upload(repo.application_id(), PNG, "application/pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttachmentError::ContentMismatch { .. }));
}

#[tokio::test]
async fn test_upload_rejects_unknown_content_type() {
    let (service, repo, _) = service(ApplicationStatus::Draft);

    let err = service
        .upload(upload(repo.application_id(), b"hello", "text/plain"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttachmentError::InvalidContentType(_)));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_upload_size_limits() {
    let (service, _, _) = service(ApplicationStatus::Draft);

    assert!(matches!(
        service.validate_file("application/pdf", b""),
        Err(AttachmentError::EmptyFile)
    ));
    let big = vec![0_u8; 2048];
    assert!(matches!(
        service.validate_file("application/pdf", &big),
        Err(AttachmentError::FileTooLarge { size: 2048, max: 1024 })
    ));
}

#[tokio::test]
async fn test_upload_rejects_type_not_allowed() {
    let (service, repo, _) = service(ApplicationStatus::Draft);
    let mut input = upload(repo.application_id(), PDF, "application/pdf");
    input.attachment_type = AttachmentType::CommissionContract;

    let err = service.upload(input).await.unwrap_err();
    assert!(matches!(err, AttachmentError::TypeNotAllowed(AttachmentType::CommissionContract)));
}

#[tokio::test]
async fn test_upload_limit() {
    let (service, repo, _) = service(ApplicationStatus::Draft);
    let app_id = repo.application_id();

    for _ in 0..MAX_ATTACHMENTS {
        service.upload(upload(app_id, PNG, "image/png")).await.unwrap();
    }
    let err = service.upload(upload(app_id, PNG, "image/png")).await.unwrap_err();
    assert!(matches!(err, AttachmentError::TooMany { max: 20 }));
}

#[tokio::test]
async fn test_applicant_can_not_upload_after_submission() {
    let (service, repo, _) = service(ApplicationStatus::Received);
    let app_id = repo.application_id();

    let err = service
        .upload(upload(app_id, PDF, "application/pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, AttachmentError::NotEditable(ApplicationStatus::Received)));

    let mut input = upload(app_id, PDF, "application/pdf");
    input.actor = Actor::Handler;
    assert!(service.upload(input).await.is_ok());
}

#[tokio::test]
async fn test_delete_removes_record_and_file() {
    let (service, repo, storage) = service(ApplicationStatus::Draft);
    let app_id = repo.application_id();
    let attachment = service
        .upload(upload(app_id, PDF, "application/pdf"))
        .await
        .unwrap();

    service
        .delete(attachment.id, app_id, Actor::Applicant)
        .await
        .unwrap();

    assert!(service.list(app_id).await.unwrap().is_empty());
    assert!(!storage.exists(&attachment.storage_key).await.unwrap());
    assert!(matches!(
        service.get_by_id(attachment.id, app_id).await,
        Err(AttachmentError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_unknown_application() {
    let (service, _, _) = service(ApplicationStatus::Draft);
    let err = service
        .upload(upload(Uuid::new_v4(), PDF, "application/pdf"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
