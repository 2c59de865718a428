//! Draft a follow-up email asking a supplier for what their quote still lacks.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{error, info};

use crate::common::QuoteId;
use crate::domains::quotes::data::ClarificationDraft;
use crate::domains::quotes::models::Quote;
use crate::domains::rfqs::models::Rfq;
use crate::domains::suppliers::models::Supplier;
use crate::kernel::{ServerDeps, StoreError};

#[derive(Debug, Error)]
pub enum ClarificationError {
    #[error("quote {0} not found")]
    QuoteNotFound(QuoteId),

    #[error("no missing information found to request")]
    NothingToClarify,

    #[error("failed to draft clarification email")]
    DraftingFailed(String),

    #[error("internal failure")]
    Internal(#[source] StoreError),
}

impl ClarificationError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ClarificationError::QuoteNotFound(_) | ClarificationError::NothingToClarify
        )
    }
}

impl From<StoreError> for ClarificationError {
    fn from(err: StoreError) -> Self {
        ClarificationError::Internal(err)
    }
}

/// What the quote still lacks relative to its RFQ.
///
/// Unstated scalar terms first, in a fixed order, then each required
/// certification the quote does not hold, sorted by name.
pub fn missing_items(
    quote: &Quote,
    quote_certifications: &[String],
    required_certifications: &[String],
) -> Vec<String> {
    let mut missing = Vec::new();
    if quote.price_per_pound.is_none() {
        missing.push("Price per pound".to_string());
    }
    if quote.country_of_origin.is_none() {
        missing.push("Country of origin".to_string());
    }
    if quote.min_order_quantity.is_none() {
        missing.push("Minimum order quantity".to_string());
    }

    let held: BTreeSet<&str> = quote_certifications.iter().map(String::as_str).collect();
    let required: BTreeSet<&str> = required_certifications.iter().map(String::as_str).collect();
    missing.extend(
        required
            .difference(&held)
            .map(|name| format!("Missing Certification: {}", name)),
    );
    missing
}

pub fn clarification_prompt(rfq: &Rfq, supplier: &Supplier, missing: &[String]) -> String {
    let contact = supplier
        .contact_name
        .as_deref()
        .unwrap_or("the sales team");
    let addressee = supplier
        .contact_name
        .clone()
        .unwrap_or_else(|| format!("the team at {}", supplier.company_name));

    format!(
        "You are a polite and professional procurement assistant. Your task is to draft an \
email to a supplier to request missing information from their recent quote.

Context:
- We sent out a Request for Quote (RFQ) for the item: \"{item}\".
- The supplier, {company}, has responded with a partial quote.
- We need to contact: {contact}.

Task:
Write a concise and friendly email requesting the following missing information:
- {missing}

The email should be addressed to {addressee} and should be ready to send. Keep it brief \
and to the point. Start the email with a greeting and end with a professional closing. \
Do not include a subject line.",
        item = rfq.item,
        company = supplier.company_name,
        contact = contact,
        missing = missing.join(", "),
        addressee = addressee,
    )
}

/// Compare a quote with its RFQ and draft an email for the missing items.
pub async fn draft_clarification_email(
    quote_id: QuoteId,
    deps: &ServerDeps,
) -> Result<ClarificationDraft, ClarificationError> {
    let mut tx = deps.store.begin().await?;

    let quote = match tx.find_quote(quote_id).await? {
        Some(quote) => quote,
        None => {
            tx.rollback().await?;
            return Err(ClarificationError::QuoteNotFound(quote_id));
        }
    };
    let rfq = tx
        .find_rfq(quote.rfq_id)
        .await?
        .ok_or_else(|| StoreError::Internal(format!("quote {} has no RFQ", quote.id)))?;
    let supplier = tx
        .find_supplier(quote.supplier_id)
        .await?
        .ok_or_else(|| StoreError::Internal(format!("quote {} has no supplier", quote.id)))?;
    let held: Vec<String> = tx
        .certifications_for_quotes(&[quote.id])
        .await?
        .into_iter()
        .map(|(_, c)| c.name)
        .collect();
    let required: Vec<String> = tx
        .certifications_for_rfqs(&[rfq.id])
        .await?
        .into_iter()
        .map(|(_, c)| c.name)
        .collect();
    tx.rollback().await?;

    let missing = missing_items(&quote, &held, &required);
    if missing.is_empty() {
        return Err(ClarificationError::NothingToClarify);
    }

    let prompt = clarification_prompt(&rfq, &supplier, &missing);
    let email_text = deps.ai.complete(&prompt).await.map_err(|e| {
        error!(quote_id = %quote_id, error = %e, "Clarification drafting failed");
        ClarificationError::DraftingFailed(e.to_string())
    })?;

    info!(quote_id = %quote_id, missing = missing.len(), "Drafted clarification email");
    Ok(ClarificationDraft {
        quote_id,
        missing_items: missing,
        email_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{RfqId, SupplierId};

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn empty_quote() -> Quote {
        Quote::builder()
            .supplier_id(SupplierId::new())
            .rfq_id(RfqId::new())
            .build()
    }

    #[test]
    fn test_missing_scalars_come_first_in_fixed_order() {
        let quote = empty_quote();
        assert_eq!(
            missing_items(&quote, &[], &names(&["Organic"])),
            names(&[
                "Price per pound",
                "Country of origin",
                "Minimum order quantity",
                "Missing Certification: Organic",
            ])
        );
    }

    #[test]
    fn test_missing_certifications_are_sorted() {
        let quote = Quote::builder()
            .supplier_id(SupplierId::new())
            .rfq_id(RfqId::new())
            .price_per_pound(Some(2.5))
            .country_of_origin(Some("USA".to_string()))
            .min_order_quantity(Some(1000))
            .build();
        assert_eq!(
            missing_items(
                &quote,
                &names(&["Halal"]),
                &names(&["Organic", "Halal", "Kosher"])
            ),
            names(&["Missing Certification: Kosher", "Missing Certification: Organic"])
        );
    }

    #[test]
    fn test_complete_quote_has_nothing_missing() {
        let quote = Quote::builder()
            .supplier_id(SupplierId::new())
            .rfq_id(RfqId::new())
            .price_per_pound(Some(2.5))
            .country_of_origin(Some("USA".to_string()))
            .min_order_quantity(Some(1000))
            .build();
        assert!(missing_items(&quote, &names(&["Organic"]), &names(&["Organic"])).is_empty());
    }

    #[test]
    fn test_prompt_falls_back_when_contact_unknown() {
        let rfq = Rfq::builder().item("Almonds").build();
        let supplier = Supplier::builder()
            .company_name("Acme")
            .contact_email("a@x.com")
            .build();
        let prompt = clarification_prompt(&rfq, &supplier, &names(&["Price per pound"]));

        assert!(prompt.contains("\"Almonds\""));
        assert!(prompt.contains("We need to contact: the sales team."));
        assert!(prompt.contains("addressed to the team at Acme"));
        assert!(prompt.contains("- Price per pound"));
    }

    #[test]
    fn test_prompt_uses_contact_name() {
        let rfq = Rfq::builder().item("Almonds").build();
        let supplier = Supplier::builder()
            .company_name("Acme")
            .contact_email("a@x.com")
            .contact_name(Some("Dana".to_string()))
            .build();
        let prompt = clarification_prompt(&rfq, &supplier, &names(&["Price per pound"]));
        assert!(prompt.contains("We need to contact: Dana."));
        assert!(prompt.contains("addressed to Dana"));
    }
}
