//! RFQ read operations

use std::collections::HashMap;

use crate::common::{QuoteId, RfqId};
use crate::domains::quotes::actions::{certification_names_by_quote, suppliers_for_quotes};
use crate::domains::quotes::data::{QuoteComparison, QuoteRecord};
use crate::domains::rfqs::actions::error::RfqError;
use crate::domains::rfqs::data::RfqRecord;
use crate::kernel::{ServerDeps, StoreError};

/// All RFQs, newest first, with their required certification names.
pub async fn list_rfqs(deps: &ServerDeps) -> Result<Vec<RfqRecord>, RfqError> {
    let mut tx = deps.store.begin().await?;
    let rfqs = tx.list_rfqs().await?;
    let ids: Vec<RfqId> = rfqs.iter().map(|r| r.id).collect();

    let mut required: HashMap<RfqId, Vec<String>> = HashMap::new();
    if !ids.is_empty() {
        for (rfq_id, certification) in tx.certifications_for_rfqs(&ids).await? {
            required.entry(rfq_id).or_default().push(certification.name);
        }
    }
    tx.rollback().await?;

    Ok(rfqs
        .into_iter()
        .map(|rfq| {
            let names = required.remove(&rfq.id).unwrap_or_default();
            RfqRecord::new(rfq, names)
        })
        .collect())
}

/// Every quote submitted against an RFQ, newest first, for side-by-side comparison.
pub async fn quotes_for_rfq(
    rfq_id: RfqId,
    deps: &ServerDeps,
) -> Result<Vec<QuoteComparison>, RfqError> {
    let mut tx = deps.store.begin().await?;
    if tx.find_rfq(rfq_id).await?.is_none() {
        tx.rollback().await?;
        return Err(RfqError::NotFound(rfq_id));
    }

    let quotes = tx.list_quotes(Some(rfq_id)).await?;
    let quote_ids: Vec<QuoteId> = quotes.iter().map(|q| q.id).collect();
    let mut certifications = certification_names_by_quote(&quote_ids, &mut *tx).await?;
    let suppliers = suppliers_for_quotes(&quotes, &mut *tx).await?;
    tx.rollback().await?;

    quotes
        .into_iter()
        .map(|quote| -> Result<QuoteComparison, RfqError> {
            let supplier = suppliers.get(&quote.supplier_id).cloned().ok_or_else(|| {
                StoreError::Internal(format!("quote {} references a missing supplier", quote.id))
            })?;
            let names = certifications.remove(&quote.id).unwrap_or_default();
            Ok(QuoteComparison {
                quote: QuoteRecord::new(quote, names),
                supplier,
            })
        })
        .collect()
}
