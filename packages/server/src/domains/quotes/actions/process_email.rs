//! Turn a supplier email into a reconciled quote.
//!
//! The extraction call happens first, outside any transaction. Everything
//! after it (supplier, certifications, quote, audit email) runs in one
//! transaction that either commits as a whole or leaves no trace.

use tracing::{error, info, warn};

use crate::common::{ExtractedQuote, RfqId};
use crate::config::CertificationMergePolicy;
use crate::domains::certifications::actions::reconcile_certifications;
use crate::domains::quotes::actions::error::ProcessEmailError;
use crate::domains::quotes::actions::log_email::log_email;
use crate::domains::quotes::actions::upsert_quote::{upsert_quote, QuoteFields};
use crate::domains::quotes::data::QuoteRecord;
use crate::domains::suppliers::actions::{resolve_supplier, ResolveSupplierError};
use crate::kernel::{ServerDeps, StoreError, StoreTx};

fn store_failure(err: StoreError, step: &'static str) -> ProcessEmailError {
    match err {
        StoreError::Conflict { constraint } => {
            warn!(step, constraint = %constraint, "Write conflict while reconciling email");
            ProcessEmailError::StorageConflict { constraint }
        }
        other => {
            error!(step, error = %other, "Storage failure while reconciling email");
            ProcessEmailError::InternalFailure
        }
    }
}

/// Reconcile one candidate inside `tx`. Does not commit.
///
/// Resolver, certification reconciler, quote upsert and audit logger run in
/// that order; the first failure stops the rest.
pub async fn reconcile_candidate(
    rfq_id: RfqId,
    raw_text: &str,
    candidate: &ExtractedQuote,
    policy: CertificationMergePolicy,
    tx: &mut dyn StoreTx,
) -> Result<QuoteRecord, ProcessEmailError> {
    let supplier = resolve_supplier(candidate, tx).await.map_err(|e| match e {
        ResolveSupplierError::MissingIdentifier => {
            warn!(rfq_id = %rfq_id, "Email has no supplier email");
            ProcessEmailError::MissingIdentifier
        }
        ResolveSupplierError::Store(err) => store_failure(err, "resolve_supplier"),
    })?;

    let certifications = reconcile_certifications(candidate.certification_names(), tx)
        .await
        .map_err(|e| store_failure(e, "reconcile_certifications"))?;

    let upserted = upsert_quote(
        supplier.id,
        rfq_id,
        QuoteFields::from_candidate(candidate),
        &certifications,
        policy,
        tx,
    )
    .await
    .map_err(|e| store_failure(e, "upsert_quote"))?;

    log_email(upserted.quote.id, raw_text, candidate, tx)
        .await
        .map_err(|e| store_failure(e, "log_email"))?;

    let names = upserted.certification_names();
    Ok(QuoteRecord::new(upserted.quote, names))
}

/// Process a raw supplier email against an existing RFQ.
pub async fn process_email(
    rfq_id: RfqId,
    raw_text: &str,
    deps: &ServerDeps,
) -> Result<QuoteRecord, ProcessEmailError> {
    info!(rfq_id = %rfq_id, bytes = raw_text.len(), "Processing supplier email");

    // The RFQ must exist before we spend an extraction call on it.
    let mut tx = deps
        .store
        .begin()
        .await
        .map_err(|e| store_failure(e, "begin"))?;
    let rfq = tx
        .find_rfq(rfq_id)
        .await
        .map_err(|e| store_failure(e, "find_rfq"))?;
    tx.rollback().await.map_err(|e| store_failure(e, "rollback"))?;
    if rfq.is_none() {
        warn!(rfq_id = %rfq_id, "RFQ not found");
        return Err(ProcessEmailError::RfqNotFound(rfq_id));
    }

    let candidate = deps.extractor.extract_quote(raw_text).await.map_err(|e| {
        warn!(rfq_id = %rfq_id, error = %e, "Extraction failed, nothing written");
        ProcessEmailError::from(e)
    })?;

    let mut tx = deps
        .store
        .begin()
        .await
        .map_err(|e| store_failure(e, "begin"))?;

    match reconcile_candidate(
        rfq_id,
        raw_text,
        &candidate,
        deps.certification_policy,
        &mut *tx,
    )
    .await
    {
        Ok(record) => {
            tx.commit().await.map_err(|e| store_failure(e, "commit"))?;
            info!(
                quote_id = %record.id,
                supplier_id = %record.supplier_id,
                rfq_id = %rfq_id,
                "Committed email reconciliation"
            );
            Ok(record)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed after reconciliation error");
            }
            Err(err)
        }
    }
}
