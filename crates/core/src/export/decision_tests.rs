use std::io::Read;

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::application::{
    Address, ApplicationFields, ApplicationStatus, CompanySnapshot, Employee, OrganizationType,
};

fn application(number: i32, company: &str) -> Application {
    Application {
        id: Uuid::new_v4(),
        application_number: number,
        status: ApplicationStatus::Accepted,
        company_id: Uuid::new_v4(),
        company: CompanySnapshot {
            name: company.into(),
            business_id: "1234567-8".into(),
            company_form_code: 16,
            address: Address {
                street_address: "Kaivokatu 1".into(),
                postcode: "00100".into(),
                city: "Helsinki".into(),
            },
        },
        organization_type: OrganizationType::Company,
        fields: ApplicationFields {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            employee: Employee {
                first_name: "Aino".into(),
                last_name: "Virtanen".into(),
                ..Employee::default()
            },
            ..ApplicationFields::default()
        },
        handler_id: None,
        batch_id: None,
        archived: false,
        calculated_benefit_amount: Some(dec!(4382.75)),
        manual_benefit_amount: None,
        case_id: None,
        case_guid: None,
        created_at: Utc::now(),
        modified_at: Utc::now(),
    }
}

fn fields() -> DecisionFields {
    DecisionFields {
        decision_maker_name: Some("Maija Meikäläinen".into()),
        section_of_the_law: Some("$1234".into()),
        decision_date: NaiveDate::from_ymd_opt(2024, 7, 15),
        ..DecisionFields::default()
    }
}

#[test]
fn test_application_document_name_and_escaping() {
    let doc = application_document(&application(7, "Kahvi & Kakku Oy"), Decision::Accepted, &fields());

    assert_eq!(doc.file_name, "7_Kahvi___Kakku_Oy_accepted.html");
    assert!(doc.content.contains("Kahvi &amp; Kakku Oy"));
    assert!(doc.content.contains("Aino Virtanen"));
    assert!(doc.content.contains("4382.75 €"));
    assert!(doc.content.contains("15.7.2024"));
}

#[test]
fn test_public_document_hides_employee() {
    let apps = vec![application(1, "Acme Oy"), application(2, "Beta Oy")];

    let public = composed_document(&apps, Decision::Accepted, &fields(), true);
    let private = composed_document(&apps, Decision::Accepted, &fields(), false);

    assert_eq!(public.file_name, "accepted_public.html");
    assert_eq!(private.file_name, "accepted_private.html");
    assert!(!public.content.contains("Virtanen"));
    assert!(private.content.contains("Virtanen"));
    assert!(public.content.contains("8765.50 €"));
}

#[test]
fn test_rejected_batch_has_no_public_document() {
    let apps = vec![application(1, "Acme Oy")];
    let names: Vec<String> = batch_documents(&apps, Decision::Rejected, &fields())
        .into_iter()
        .map(|d| d.file_name)
        .collect();

    assert_eq!(names, vec!["1_Acme_Oy_rejected.html", "rejected_private.html"]);
}

#[test]
fn test_zip_contains_all_documents() {
    let apps = vec![application(1, "Acme Oy"), application(2, "Beta Oy")];
    let docs = batch_documents(&apps, Decision::Accepted, &fields());
    let bytes = zip_documents(&docs).unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 4);

    let mut content = String::new();
    archive
        .by_name("accepted_private.html")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert!(content.contains("Beta Oy"));
}

#[test]
fn test_zip_of_nothing() {
    assert!(matches!(zip_documents(&[]), Err(ExportError::Empty)));
}
