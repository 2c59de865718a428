use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::common::{CertificationId, QuoteId, RfqId};

/// Certification - identified by its exact name, created on first sighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Certification {
    pub id: CertificationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Certification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CertificationId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Helper struct for batch-loading certifications with the quote they belong to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CertificationWithQuoteId {
    pub quote_id: QuoteId,
    #[sqlx(flatten)]
    pub certification: Certification,
}

/// Helper struct for batch-loading certifications required by RFQs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CertificationWithRfqId {
    pub rfq_id: RfqId,
    #[sqlx(flatten)]
    pub certification: Certification,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Certification {
    /// Batch lookup by exact names
    pub async fn find_by_names(names: &[String], conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Certification>("SELECT * FROM certifications WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&mut *conn)
            .await
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO certifications (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.created_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Batch-load certifications for multiple quotes
    pub async fn find_for_quote_ids(
        quote_ids: &[QuoteId],
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<CertificationWithQuoteId>> {
        sqlx::query_as::<_, CertificationWithQuoteId>(
            r#"
            SELECT qc.quote_id, c.*
            FROM certifications c
            INNER JOIN quote_certifications qc ON qc.certification_id = c.id
            WHERE qc.quote_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(quote_ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// Batch-load required certifications for multiple RFQs
    pub async fn find_for_rfq_ids(
        rfq_ids: &[RfqId],
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<CertificationWithRfqId>> {
        sqlx::query_as::<_, CertificationWithRfqId>(
            r#"
            SELECT rc.rfq_id, c.*
            FROM certifications c
            INNER JOIN rfq_certifications rc ON rc.certification_id = c.id
            WHERE rc.rfq_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(rfq_ids)
        .fetch_all(&mut *conn)
        .await
    }
}
