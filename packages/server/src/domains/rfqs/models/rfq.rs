use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use typed_builder::TypedBuilder;

use crate::common::{CertificationId, RfqId};

/// RFQ - a sourcing need that suppliers quote against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Rfq {
    #[builder(default = RfqId::new())]
    pub id: RfqId,
    pub item: String,
    #[builder(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[builder(default)]
    pub amount_required_lbs: Option<f64>,
    #[builder(default)]
    pub ship_to_location: Option<String>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Rfq {
    pub async fn find_by_id(id: RfqId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn find_by_ids(ids: &[RfqId], conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// Find all RFQs, newest first
    pub async fn find_all(conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs ORDER BY created_at DESC, id DESC")
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Rfq>(
            r#"
            INSERT INTO rfqs (id, item, due_date, amount_required_lbs, ship_to_location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.item)
        .bind(self.due_date)
        .bind(self.amount_required_lbs)
        .bind(&self.ship_to_location)
        .bind(self.created_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Attach required certifications (idempotent per pair)
    pub async fn link_certifications(
        rfq_id: RfqId,
        certification_ids: &[CertificationId],
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        if certification_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO rfq_certifications (rfq_id, certification_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(rfq_id)
        .bind(certification_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
