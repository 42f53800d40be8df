//! Benefit applications.
//!
//! - `types` - Application, employee, and de minimis aid types
//! - `rules` - Field validation and available benefit types
//! - `ssn` - Personal identity code checksum

mod error;
pub mod rules;
pub mod ssn;
mod types;

pub use error::ApplicationError;
pub use rules::{RuleContext, available_benefit_types, validate_fields, validate_for_submission};
pub use types::{
    Address, Application, ApplicationFields, ApplicationStatus, BenefitType, CompanySnapshot,
    DeMinimisAid, Employee, Language, OrganizationType,
};

/// Handler assignment is allowed in these statuses.
#[must_use]
pub const fn can_assign_handler(status: ApplicationStatus) -> bool {
    matches!(status, ApplicationStatus::Received | ApplicationStatus::Handling)
}

/// Handler unassignment is allowed in these statuses.
#[must_use]
pub const fn can_unassign_handler(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::Draft | ApplicationStatus::Received | ApplicationStatus::Handling
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    fn application() -> Application {
        Application {
            id: Uuid::new_v4(),
            application_number: 1,
            status: ApplicationStatus::Draft,
            company_id: Uuid::new_v4(),
            company: CompanySnapshot {
                name: "Acme Oy".into(),
                business_id: "1234567-8".into(),
                company_form_code: 16,
                address: Address {
                    street_address: "Kaivokatu 1".into(),
                    postcode: "00100".into(),
                    city: "Helsinki".into(),
                },
            },
            organization_type: OrganizationType::Company,
            fields: ApplicationFields::default(),
            handler_id: None,
            batch_id: None,
            archived: false,
            calculated_benefit_amount: None,
            manual_benefit_amount: None,
            case_id: None,
            case_guid: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn test_benefit_amount_prefers_manual() {
        let mut app = application();
        assert_eq!(app.benefit_amount(), None);

        app.calculated_benefit_amount = Some(dec!(4800));
        assert_eq!(app.benefit_amount(), Some(dec!(4800)));

        app.manual_benefit_amount = Some(dec!(5000));
        assert_eq!(app.benefit_amount(), Some(dec!(5000)));
    }

    #[test]
    fn test_effective_address() {
        let mut app = application();
        let alternative = Address {
            street_address: "Postilokero 5".into(),
            postcode: "00101".into(),
            city: "Helsinki".into(),
        };
        app.fields.alternative_address = Some(alternative.clone());
        assert_eq!(app.effective_address().street_address, "Kaivokatu 1");

        app.fields.use_alternative_address = true;
        assert_eq!(app.effective_address(), &alternative);
    }

    #[test]
    fn test_organization_type_resolution() {
        assert_eq!(OrganizationType::resolve(29, &[29]), OrganizationType::Association);
        assert_eq!(OrganizationType::resolve(16, &[29]), OrganizationType::Company);
    }

    #[test]
    fn test_handler_assignment_statuses() {
        assert!(can_assign_handler(ApplicationStatus::Received));
        assert!(can_assign_handler(ApplicationStatus::Handling));
        assert!(!can_assign_handler(ApplicationStatus::Draft));
        assert!(can_unassign_handler(ApplicationStatus::Draft));
        assert!(!can_unassign_handler(ApplicationStatus::Accepted));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("pending"), None);
    }
}
