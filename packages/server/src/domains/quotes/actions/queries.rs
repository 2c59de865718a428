//! Quote read operations. Relations are batch-loaded, never per row.

use std::collections::HashMap;

use crate::common::{QuoteId, RfqId, SupplierId};
use crate::domains::quotes::actions::error::QuoteError;
use crate::domains::quotes::data::{EmailRecord, QuoteDetails, QuoteRecord};
use crate::domains::quotes::models::Quote;
use crate::domains::rfqs::data::RfqSummary;
use crate::domains::suppliers::data::SupplierSummary;
use crate::kernel::{ServerDeps, StoreError, StoreResult, StoreTx};

/// Certification names per quote, each list sorted by name.
pub(crate) async fn certification_names_by_quote(
    quote_ids: &[QuoteId],
    tx: &mut dyn StoreTx,
) -> StoreResult<HashMap<QuoteId, Vec<String>>> {
    let mut names: HashMap<QuoteId, Vec<String>> = HashMap::new();
    if quote_ids.is_empty() {
        return Ok(names);
    }
    for (quote_id, certification) in tx.certifications_for_quotes(quote_ids).await? {
        names.entry(quote_id).or_default().push(certification.name);
    }
    Ok(names)
}

/// Load supplier summaries for `quotes`, keyed by supplier id.
pub(crate) async fn suppliers_for_quotes(
    quotes: &[Quote],
    tx: &mut dyn StoreTx,
) -> StoreResult<HashMap<SupplierId, SupplierSummary>> {
    let ids: Vec<SupplierId> = quotes.iter().map(|q| q.supplier_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(tx
        .find_suppliers_by_ids(&ids)
        .await?
        .into_iter()
        .map(|s| (s.id, SupplierSummary::from(s)))
        .collect())
}

fn dangling(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::Internal(format!("quote references missing {} {}", what, id))
}

/// Every quote, newest first, with supplier, RFQ and certification names.
pub async fn list_quotes(deps: &ServerDeps) -> Result<Vec<QuoteDetails>, QuoteError> {
    let mut tx = deps.store.begin().await?;

    let quotes = tx.list_quotes(None).await?;
    let quote_ids: Vec<QuoteId> = quotes.iter().map(|q| q.id).collect();
    let rfq_ids: Vec<RfqId> = quotes.iter().map(|q| q.rfq_id).collect();

    let mut certifications = certification_names_by_quote(&quote_ids, &mut *tx).await?;
    let suppliers = suppliers_for_quotes(&quotes, &mut *tx).await?;
    let rfqs: HashMap<RfqId, RfqSummary> = if rfq_ids.is_empty() {
        HashMap::new()
    } else {
        tx.find_rfqs_by_ids(&rfq_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, RfqSummary::from(r)))
            .collect()
    };
    tx.rollback().await?;

    quotes
        .into_iter()
        .map(|quote| -> Result<QuoteDetails, QuoteError> {
            let supplier = suppliers
                .get(&quote.supplier_id)
                .cloned()
                .ok_or_else(|| dangling("supplier", quote.supplier_id))?;
            let rfq = rfqs
                .get(&quote.rfq_id)
                .cloned()
                .ok_or_else(|| dangling("rfq", quote.rfq_id))?;
            let names = certifications.remove(&quote.id).unwrap_or_default();
            Ok(QuoteDetails {
                quote: QuoteRecord::new(quote, names),
                supplier,
                rfq,
            })
        })
        .collect()
}

/// Audit emails for a quote, oldest first.
pub async fn quote_emails(
    quote_id: QuoteId,
    deps: &ServerDeps,
) -> Result<Vec<EmailRecord>, QuoteError> {
    let mut tx = deps.store.begin().await?;
    if tx.find_quote(quote_id).await?.is_none() {
        tx.rollback().await?;
        return Err(QuoteError::NotFound(quote_id));
    }
    let emails = tx.emails_for_quote(quote_id).await?;
    tx.rollback().await?;
    Ok(emails.into_iter().map(EmailRecord::from).collect())
}
