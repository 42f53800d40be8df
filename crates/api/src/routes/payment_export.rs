//! CSV feed for the payment system.

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use benefit_core::export::{PaymentRow, payment_csv};
use benefit_db::BatchRepository;

use crate::{AppState, error::ApiError, middleware::PaymentRobot};

/// Creates the payment export route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/payment-export", get(payment_export))
}

/// Query parameters for the payment export.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentExportQuery {
    /// `1` or `true` leaves the batches in `accepted`.
    pub skip_update: Option<String>,
}

impl PaymentExportQuery {
    fn skip_update(&self) -> bool {
        matches!(self.skip_update.as_deref(), Some("1" | "true"))
    }
}

/// GET `/payment-export`
///
/// Every accepted batch goes into one file; the batches then move to
/// `sent_to_payment_system` unless `skip_update` is set.
async fn payment_export(
    State(state): State<AppState>,
    _robot: PaymentRobot,
    Query(query): Query<PaymentExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BatchRepository::new(
        (*state.db).clone(),
        state.config.benefit.association_form_codes.clone(),
    );
    let batches = repo.accepted_for_payment().await?;

    let rows: Vec<PaymentRow> = batches
        .iter()
        .flat_map(|b| {
            b.applications
                .iter()
                .map(|a| PaymentRow::new(a, &b.batch.decision_fields))
        })
        .collect();
    let row_count = rows.len();
    let csv = payment_csv(rows)?;

    let ids: Vec<Uuid> = batches.iter().map(|b| b.batch.id).collect();
    if query.skip_update() {
        info!(batches = ids.len(), rows = row_count, "Payment export created, batches left as is");
    } else {
        repo.mark_sent_to_payment(&ids).await?;
        info!(batches = ids.len(), rows = row_count, "Payment export created");
    }

    let file_name = format!(
        "helsinki_benefit_payments_{}.csv",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, false)]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some("0"), false)]
    #[case(Some("yes"), false)]
    fn test_skip_update_flag(#[case] value: Option<&str>, #[case] expected: bool) {
        let query = PaymentExportQuery {
            skip_update: value.map(str::to_string),
        };
        assert_eq!(query.skip_update(), expected);
    }
}
