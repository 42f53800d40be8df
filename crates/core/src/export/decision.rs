//! Decision documents and the zip bundle sent to the decision maker.

use std::fmt::Write as _;
use std::io::{Cursor, Write as _};

use rust_decimal::Decimal;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::error::ExportError;
use crate::application::Application;
use crate::batch::{Decision, DecisionFields};
use crate::storage::sanitize_filename;

/// A file inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionDocument {
    /// File name inside the zip.
    pub file_name: String,
    /// HTML content.
    pub content: String,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn title(decision: Decision) -> &'static str {
    match decision {
        Decision::Accepted => "Myönteinen päätös",
        Decision::Rejected => "Kielteinen päätös",
    }
}

fn amount(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{} €", v.round_dp(2)))
}

fn period(application: &Application) -> String {
    match (application.fields.start_date, application.fields.end_date) {
        (Some(start), Some(end)) => {
            format!("{} - {}", start.format("%-d.%-m.%Y"), end.format("%-d.%-m.%Y"))
        }
        _ => "-".to_string(),
    }
}

fn page(heading: &str, body: &str, fields: &DecisionFields) -> String {
    let field = |v: &Option<String>| escape(v.as_deref().unwrap_or("-"));
    let date = fields
        .decision_date
        .map_or_else(|| "-".to_string(), |d| d.format("%-d.%-m.%Y").to_string());

    format!(
        "<!DOCTYPE html>\n<html lang=\"fi\">\n<head><meta charset=\"utf-8\"><title>{heading}</title></head>\n<body>\n\
         <h1>{heading}</h1>\n{body}\
         <p>Päätöspäivä: {date}</p>\n\
         <p>Lainkohta: {section}</p>\n\
         <p>Päättäjä: {maker_name}, {maker_title}</p>\n\
         <p>Asiantuntija: {expert_name}, {expert_title}</p>\n\
         </body>\n</html>\n",
        heading = escape(heading),
        section = field(&fields.section_of_the_law),
        maker_name = field(&fields.decision_maker_name),
        maker_title = field(&fields.decision_maker_title),
        expert_name = field(&fields.expert_inspector_name),
        expert_title = field(&fields.expert_inspector_title),
    )
}

/// Decision document for one application.
#[must_use]
pub fn application_document(
    application: &Application,
    decision: Decision,
    fields: &DecisionFields,
) -> DecisionDocument {
    let employee = &application.fields.employee;
    let address = application.effective_address();
    let body = format!(
        "<p>Hakemusnumero: {number}</p>\n\
         <p>Hakija: {company} ({business_id})</p>\n\
         <p>Osoite: {street}, {postcode} {city}</p>\n\
         <p>Työntekijä: {first} {last}</p>\n\
         <p>Tukiaika: {period}</p>\n\
         <p>Helsinki-lisä: {amount}</p>\n",
        number = application.application_number,
        company = escape(&application.company.name),
        business_id = escape(&application.company.business_id),
        street = escape(&address.street_address),
        postcode = escape(&address.postcode),
        city = escape(&address.city),
        first = escape(&employee.first_name),
        last = escape(&employee.last_name),
        period = period(application),
        amount = amount(application.benefit_amount()),
    );

    DecisionDocument {
        file_name: format!(
            "{}_{}_{}.html",
            application.application_number,
            sanitize_filename(&application.company.name),
            decision
        ),
        content: page(title(decision), &body, fields),
    }
}

/// Summary of all applications in the batch.
///
/// The public version leaves out employee names.
#[must_use]
pub fn composed_document(
    applications: &[Application],
    decision: Decision,
    fields: &DecisionFields,
    public: bool,
) -> DecisionDocument {
    let mut body = String::from("<table>\n<tr><th>Hakemus</th><th>Hakija</th><th>Y-tunnus</th>");
    if !public {
        body.push_str("<th>Työntekijä</th>");
    }
    body.push_str("<th>Tukiaika</th><th>Helsinki-lisä</th></tr>\n");

    let mut total = Decimal::ZERO;
    for application in applications {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            application.application_number,
            escape(&application.company.name),
            escape(&application.company.business_id),
        );
        if !public {
            let employee = &application.fields.employee;
            let _ = write!(
                body,
                "<td>{} {}</td>",
                escape(&employee.first_name),
                escape(&employee.last_name)
            );
        }
        let _ = writeln!(
            body,
            "<td>{}</td><td>{}</td></tr>",
            period(application),
            amount(application.benefit_amount())
        );
        total += application.benefit_amount().unwrap_or_default();
    }
    body.push_str("</table>\n");
    if decision == Decision::Accepted {
        let _ = writeln!(body, "<p>Yhteensä: {}</p>", amount(Some(total)));
    }

    let visibility = if public { "public" } else { "private" };
    DecisionDocument {
        file_name: format!("{decision}_{visibility}.html"),
        content: page(title(decision), &body, fields),
    }
}

/// All documents of a batch.
#[must_use]
pub fn batch_documents(
    applications: &[Application],
    decision: Decision,
    fields: &DecisionFields,
) -> Vec<DecisionDocument> {
    let mut documents: Vec<DecisionDocument> = applications
        .iter()
        .map(|a| application_document(a, decision, fields))
        .collect();
    if decision == Decision::Accepted {
        documents.push(composed_document(applications, decision, fields, true));
    }
    documents.push(composed_document(applications, decision, fields, false));
    documents
}

/// Packs documents into a zip archive.
pub fn zip_documents(documents: &[DecisionDocument]) -> Result<Vec<u8>, ExportError> {
    if documents.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for document in documents {
        writer.start_file(document.file_name.as_str(), options)?;
        writer.write_all(document.content.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
