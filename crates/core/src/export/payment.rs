//! Payment system CSV.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ExportError;
use crate::application::Application;
use crate::batch::DecisionFields;

/// One application in the payment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRow {
    /// Application number.
    pub application_number: i32,
    /// Company name.
    pub company_name: String,
    /// Business id.
    pub business_id: String,
    /// Employee first name.
    pub employee_first_name: String,
    /// Employee last name.
    pub employee_last_name: String,
    /// Benefit type.
    pub benefit_type: String,
    /// Benefit start.
    pub start_date: Option<NaiveDate>,
    /// Benefit end.
    pub end_date: Option<NaiveDate>,
    /// Amount to pay.
    pub benefit_amount: Option<Decimal>,
    /// IBAN.
    pub bank_account: String,
    /// Decision date of the batch.
    pub decision_date: Option<NaiveDate>,
    /// Section of the law of the batch decision.
    pub section_of_the_law: String,
}

impl PaymentRow {
    /// Row for an application in a batch with the given decision fields.
    #[must_use]
    pub fn new(application: &Application, decision: &DecisionFields) -> Self {
        let fields = &application.fields;
        Self {
            application_number: application.application_number,
            company_name: application.company.name.clone(),
            business_id: application.company.business_id.clone(),
            employee_first_name: fields.employee.first_name.clone(),
            employee_last_name: fields.employee.last_name.clone(),
            benefit_type: fields
                .benefit_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            start_date: fields.start_date,
            end_date: fields.end_date,
            benefit_amount: application.benefit_amount().map(|a| a.round_dp(2)),
            bank_account: fields.company_bank_account_number.clone().unwrap_or_default(),
            decision_date: decision.decision_date,
            section_of_the_law: decision.section_of_the_law.clone().unwrap_or_default(),
        }
    }
}

/// Writes the payment CSV, `;` separated with a header row.
///
/// Rows are sorted by company name, then application number.
pub fn payment_csv(mut rows: Vec<PaymentRow>) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }
    rows.sort_by(|a, b| {
        a.company_name
            .cmp(&b.company_name)
            .then(a.application_number.cmp(&b.application_number))
    });

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    for row in &rows {
        writer.serialize(row)?;
    }
    Ok(writer.into_inner()?)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn row(number: i32, company: &str) -> PaymentRow {
        PaymentRow {
            application_number: number,
            company_name: company.into(),
            business_id: "1234567-8".into(),
            employee_first_name: "Aino".into(),
            employee_last_name: "Virtanen".into(),
            benefit_type: "salary".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            benefit_amount: Some(dec!(4382.75)),
            bank_account: "FI2112345600000785".into(),
            decision_date: NaiveDate::from_ymd_opt(2024, 7, 15),
            section_of_the_law: "$1234".into(),
        }
    }

    #[test]
    fn test_header_and_delimiter() {
        let csv = String::from_utf8(payment_csv(vec![row(1, "Acme Oy")]).unwrap()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some(
                "application_number;company_name;business_id;employee_first_name;\
                 employee_last_name;benefit_type;start_date;end_date;benefit_amount;\
                 bank_account;decision_date;section_of_the_law"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "1;Acme Oy;1234567-8;Aino;Virtanen;salary;2024-01-01;2024-06-30;4382.75;\
                 FI2112345600000785;2024-07-15;$1234"
            )
        );
    }

    #[test]
    fn test_rows_sorted_by_company_then_number() {
        let csv = payment_csv(vec![row(3, "Beta Oy"), row(2, "Acme Oy"), row(1, "Beta Oy")]).unwrap();
        let numbers: Vec<String> = String::from_utf8(csv)
            .unwrap()
            .lines()
            .skip(1)
            .map(|l| l.split(';').next().unwrap().to_string())
            .collect();
        assert_eq!(numbers, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_empty_export() {
        assert!(matches!(payment_csv(Vec::new()), Err(ExportError::Empty)));
    }
}
