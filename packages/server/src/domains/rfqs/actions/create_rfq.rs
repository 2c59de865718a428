use chrono::{DateTime, Utc};
use tracing::info;

use crate::domains::certifications::actions::reconcile_certifications;
use crate::domains::rfqs::actions::error::RfqError;
use crate::domains::rfqs::data::RfqRecord;
use crate::domains::rfqs::models::Rfq;
use crate::kernel::ServerDeps;

/// Input for opening a new RFQ.
#[derive(Debug, Clone, Default)]
pub struct NewRfq {
    pub item: String,
    pub due_date: Option<DateTime<Utc>>,
    pub amount_required_lbs: Option<f64>,
    pub ship_to_location: Option<String>,
    /// Names of required certifications; unknown names are created.
    pub required_certifications: Vec<String>,
}

/// Create an RFQ and link its required certifications in one transaction.
pub async fn create_rfq(input: NewRfq, deps: &ServerDeps) -> Result<RfqRecord, RfqError> {
    let item = input.item.trim();
    if item.is_empty() {
        return Err(RfqError::Invalid("item is required".to_string()));
    }
    if input.amount_required_lbs.is_some_and(|lbs| !lbs.is_finite() || lbs < 0.0) {
        return Err(RfqError::Invalid(
            "amount_required_lbs must be a non-negative number".to_string(),
        ));
    }

    let rfq = Rfq::builder()
        .item(item)
        .due_date(input.due_date)
        .amount_required_lbs(input.amount_required_lbs)
        .ship_to_location(input.ship_to_location)
        .build();

    let mut tx = deps.store.begin().await?;
    let rfq = tx.insert_rfq(&rfq).await?;
    let certifications = reconcile_certifications(&input.required_certifications, &mut *tx).await?;
    let ids: Vec<_> = certifications.iter().map(|c| c.id).collect();
    tx.link_rfq_certifications(rfq.id, &ids).await?;
    tx.commit().await?;

    info!(rfq_id = %rfq.id, certifications = ids.len(), "Created RFQ");

    let mut names: Vec<String> = certifications.into_iter().map(|c| c.name).collect();
    names.sort();
    Ok(RfqRecord::new(rfq, names))
}
