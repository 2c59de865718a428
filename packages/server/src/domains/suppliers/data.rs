use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::SupplierId;
use crate::domains::suppliers::models::Supplier;

/// Full supplier record returned by the management operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub id: SupplierId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub hq_address: Option<String>,
    pub payment_terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Supplier> for SupplierRecord {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            company_name: supplier.company_name,
            contact_name: supplier.contact_name,
            contact_email: supplier.contact_email,
            contact_phone: supplier.contact_phone,
            hq_address: supplier.hq_address,
            payment_terms: supplier.payment_terms,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}

/// Supplier as shown next to a quote in comparison views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSummary {
    pub id: SupplierId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub hq_address: Option<String>,
    pub payment_terms: Option<String>,
}

impl From<Supplier> for SupplierSummary {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            company_name: supplier.company_name,
            contact_name: supplier.contact_name,
            hq_address: supplier.hq_address,
            payment_terms: supplier.payment_terms,
        }
    }
}
