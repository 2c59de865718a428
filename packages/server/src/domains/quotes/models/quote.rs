use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use typed_builder::TypedBuilder;

use crate::common::{CertificationId, QuoteId, RfqId, SupplierId};

/// Quote - a supplier's offer against one RFQ, unique per (supplier, rfq)
///
/// The scalar terms are independently nullable: `None` means "not stated by
/// the supplier yet", not "no value".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Quote {
    #[builder(default = QuoteId::new())]
    pub id: QuoteId,
    pub supplier_id: SupplierId,
    pub rfq_id: RfqId,
    #[builder(default)]
    pub price_per_pound: Option<f64>,
    #[builder(default)]
    pub country_of_origin: Option<String>,
    #[builder(default)]
    pub min_order_quantity: Option<i64>,
    #[builder(default = Utc::now())]
    pub date_submitted: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Quote {
    pub async fn find_by_id(id: QuoteId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find the quote for a (supplier, rfq) pair and lock it until the
    /// transaction ends. A concurrent email for the same pair waits here and
    /// then merges into the committed row.
    pub async fn find_for_pair(
        supplier_id: SupplierId,
        rfq_id: RfqId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Quote>(
            "SELECT * FROM quotes WHERE supplier_id = $1 AND rfq_id = $2 FOR UPDATE",
        )
        .bind(supplier_id)
        .bind(rfq_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Find quotes, newest first, optionally restricted to one RFQ
    pub async fn find_all(rfq_id: Option<RfqId>, conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
            WHERE ($1::uuid IS NULL OR rfq_id = $1)
            ORDER BY date_submitted DESC, id DESC
            "#,
        )
        .bind(rfq_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (
                id, supplier_id, rfq_id, price_per_pound, country_of_origin,
                min_order_quantity, date_submitted, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.supplier_id)
        .bind(self.rfq_id)
        .bind(self.price_per_pound)
        .bind(&self.country_of_origin)
        .bind(self.min_order_quantity)
        .bind(self.date_submitted)
        .bind(self.updated_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Persist the merged scalar terms
    pub async fn update_terms(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET price_per_pound = $2,
                country_of_origin = $3,
                min_order_quantity = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.price_per_pound)
        .bind(&self.country_of_origin)
        .bind(self.min_order_quantity)
        .fetch_one(&mut *conn)
        .await
    }

    /// Replace the quote's certification set with exactly `certification_ids`
    pub async fn replace_certifications(
        quote_id: QuoteId,
        certification_ids: &[CertificationId],
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM quote_certifications WHERE quote_id = $1")
            .bind(quote_id)
            .execute(&mut *conn)
            .await?;

        if certification_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO quote_certifications (quote_id, certification_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(quote_id)
        .bind(certification_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
