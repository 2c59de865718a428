//! Explicit supplier management. This is the only path that edits suppliers.

use thiserror::Error;
use tracing::{info, warn};

use crate::common::SupplierId;
use crate::domains::suppliers::data::SupplierRecord;
use crate::domains::suppliers::models::{Supplier, SupplierUpdate};
use crate::kernel::{ServerDeps, StoreError};

#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("invalid supplier: {0}")]
    Invalid(String),

    #[error("supplier not found")]
    NotFound,

    #[error("supplier conflicts with an existing one ({constraint})")]
    Conflict { constraint: String },

    #[error("internal failure")]
    Internal(#[source] StoreError),
}

impl SupplierError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            SupplierError::Invalid(_) | SupplierError::NotFound | SupplierError::Conflict { .. }
        )
    }
}

impl From<StoreError> for SupplierError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint } => SupplierError::Conflict { constraint },
            StoreError::NotFound => SupplierError::NotFound,
            other => SupplierError::Internal(other),
        }
    }
}

/// Input for creating a supplier by hand.
#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    pub company_name: String,
    pub contact_email: String,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub hq_address: Option<String>,
    pub payment_terms: Option<String>,
}

fn required(value: &str, field: &str) -> Result<String, SupplierError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SupplierError::Invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub async fn create_supplier(
    input: NewSupplier,
    deps: &ServerDeps,
) -> Result<SupplierRecord, SupplierError> {
    let supplier = Supplier::builder()
        .company_name(required(&input.company_name, "company_name")?)
        .contact_email(required(&input.contact_email, "contact_email")?)
        .contact_name(input.contact_name)
        .contact_phone(input.contact_phone)
        .hq_address(input.hq_address)
        .payment_terms(input.payment_terms)
        .build();

    let mut tx = deps.store.begin().await?;
    let created = tx.insert_supplier(&supplier).await?;
    tx.commit().await?;

    info!(supplier_id = %created.id, "Created supplier");
    Ok(created.into())
}

/// All suppliers ordered by company name
pub async fn list_suppliers(deps: &ServerDeps) -> Result<Vec<SupplierRecord>, SupplierError> {
    let mut tx = deps.store.begin().await?;
    let suppliers = tx.list_suppliers().await?;
    tx.rollback().await?;
    Ok(suppliers.into_iter().map(SupplierRecord::from).collect())
}

/// Apply a partial update; fields left `None` are untouched.
pub async fn update_supplier(
    supplier_id: SupplierId,
    update: SupplierUpdate,
    deps: &ServerDeps,
) -> Result<SupplierRecord, SupplierError> {
    if update.is_empty() {
        warn!(supplier_id = %supplier_id, "Rejected empty supplier update");
        return Err(SupplierError::Invalid("no update data provided".to_string()));
    }
    if let Some(name) = &update.company_name {
        required(name, "company_name")?;
    }
    if let Some(email) = &update.contact_email {
        required(email, "contact_email")?;
    }

    let mut tx = deps.store.begin().await?;
    let mut supplier = tx
        .find_supplier(supplier_id)
        .await?
        .ok_or(SupplierError::NotFound)?;

    supplier.apply(SupplierUpdate {
        company_name: update.company_name.map(|n| n.trim().to_string()),
        contact_email: update.contact_email.map(|e| e.trim().to_string()),
        ..update
    });

    let updated = tx.update_supplier(&supplier).await?;
    tx.commit().await?;

    info!(supplier_id = %updated.id, "Updated supplier");
    Ok(updated.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_is_a_caller_error() {
        let err: SupplierError = StoreError::Conflict {
            constraint: "suppliers_company_name_key".to_string(),
        }
        .into();
        assert!(err.is_caller_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_internal_hides_detail() {
        let err: SupplierError = StoreError::Internal("connection reset".to_string()).into();
        assert_eq!(err.to_string(), "internal failure");
    }
}
