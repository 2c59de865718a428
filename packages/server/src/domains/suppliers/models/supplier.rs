use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use typed_builder::TypedBuilder;

use crate::common::SupplierId;

/// Supplier - identified by contact email, company name is also unique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Supplier {
    #[builder(default = SupplierId::new())]
    pub id: SupplierId,
    pub company_name: String,
    #[builder(default)]
    pub contact_name: Option<String>,
    pub contact_email: String,
    #[builder(default)]
    pub contact_phone: Option<String>,
    #[builder(default)]
    pub hq_address: Option<String>,
    #[builder(default)]
    pub payment_terms: Option<String>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

/// Partial update for the explicit supplier edit path.
///
/// `None` leaves a field untouched. This is the only way supplier rows change
/// after creation; email reconciliation never edits suppliers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierUpdate {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub hq_address: Option<String>,
    pub payment_terms: Option<String>,
}

impl SupplierUpdate {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.contact_name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.hq_address.is_none()
            && self.payment_terms.is_none()
    }
}

impl Supplier {
    /// Apply a partial update in place and bump `updated_at`.
    pub fn apply(&mut self, update: SupplierUpdate) {
        if let Some(company_name) = update.company_name {
            self.company_name = company_name;
        }
        if let Some(contact_email) = update.contact_email {
            self.contact_email = contact_email;
        }
        if update.contact_name.is_some() {
            self.contact_name = update.contact_name;
        }
        if update.contact_phone.is_some() {
            self.contact_phone = update.contact_phone;
        }
        if update.hq_address.is_some() {
            self.hq_address = update.hq_address;
        }
        if update.payment_terms.is_some() {
            self.payment_terms = update.payment_terms;
        }
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Supplier {
    pub async fn find_by_id(id: SupplierId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find supplier by contact email (exact match)
    pub async fn find_by_email(email: &str, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE contact_email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Batch-load suppliers for a set of quotes
    pub async fn find_by_ids(ids: &[SupplierId], conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn find_all(conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY company_name")
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (
                id, company_name, contact_name, contact_email, contact_phone,
                hq_address, payment_terms, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.company_name)
        .bind(&self.contact_name)
        .bind(&self.contact_email)
        .bind(&self.contact_phone)
        .bind(&self.hq_address)
        .bind(&self.payment_terms)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn update(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET company_name = $2,
                contact_name = $3,
                contact_email = $4,
                contact_phone = $5,
                hq_address = $6,
                payment_terms = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.company_name)
        .bind(&self.contact_name)
        .bind(&self.contact_email)
        .bind(&self.contact_phone)
        .bind(&self.hq_address)
        .bind(&self.payment_terms)
        .fetch_one(&mut *conn)
        .await
    }
}
