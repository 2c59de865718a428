//! Find or create the supplier a candidate record refers to.

use thiserror::Error;
use tracing::{debug, info};

use crate::common::ExtractedQuote;
use crate::domains::suppliers::models::Supplier;
use crate::kernel::{StoreError, StoreTx};

#[derive(Debug, Error)]
pub enum ResolveSupplierError {
    #[error("no supplier email found in the text")]
    MissingIdentifier,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Unique stand-in company name for suppliers whose email lacks one.
pub fn placeholder_company_name(email: &str) -> String {
    format!("Supplier ({})", email)
}

/// Look the supplier up by exact (trimmed) contact email, creating it if
/// unknown. Existing suppliers are returned untouched even when the candidate
/// carries different contact details.
pub async fn resolve_supplier(
    candidate: &ExtractedQuote,
    tx: &mut dyn StoreTx,
) -> Result<Supplier, ResolveSupplierError> {
    let email = candidate
        .supplier_email()
        .ok_or(ResolveSupplierError::MissingIdentifier)?;

    if let Some(existing) = tx.find_supplier_by_email(email).await? {
        debug!(supplier_id = %existing.id, "Matched existing supplier");
        return Ok(existing);
    }

    let company_name = candidate
        .company_name()
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_company_name(email));

    let supplier = Supplier::builder()
        .company_name(company_name)
        .contact_email(email)
        .contact_name(candidate.contact_name().map(str::to_string))
        .contact_phone(candidate.supplier_phone().map(str::to_string))
        .build();

    let created = tx.insert_supplier(&supplier).await?;
    info!(
        supplier_id = %created.id,
        company_name = %created.company_name,
        "Created supplier from email"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_company_name() {
        assert_eq!(
            placeholder_company_name("a@x.com"),
            "Supplier (a@x.com)"
        );
    }
}
