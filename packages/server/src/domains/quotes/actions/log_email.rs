use tracing::debug;

use crate::common::{ExtractedQuote, QuoteId};
use crate::domains::quotes::models::Email;
use crate::kernel::{StoreError, StoreResult, StoreTx};

/// Append the audit record for a processed email.
///
/// The candidate is stored as extracted, including fields the merge ignores.
pub async fn log_email(
    quote_id: QuoteId,
    raw_text: &str,
    candidate: &ExtractedQuote,
    tx: &mut dyn StoreTx,
) -> StoreResult<Email> {
    let extracted_data = serde_json::to_value(candidate)
        .map_err(|e| StoreError::Internal(format!("failed to serialize candidate: {}", e)))?;

    let email = tx
        .insert_email(&Email::new(quote_id, raw_text, extracted_data))
        .await?;
    debug!(email_id = %email.id, quote_id = %quote_id, "Logged email");
    Ok(email)
}
