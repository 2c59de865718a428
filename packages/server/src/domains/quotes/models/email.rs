use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgConnection;

use crate::common::{EmailId, QuoteId};

/// Email - append-only audit record of a processed supplier email
///
/// `extracted_data` is the candidate record exactly as the extraction service
/// returned it, including fields the merge ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Email {
    pub id: EmailId,
    pub quote_id: QuoteId,
    pub raw_text: String,
    pub extracted_data: JsonValue,
    pub received_at: DateTime<Utc>,
}

impl Email {
    pub fn new(quote_id: QuoteId, raw_text: impl Into<String>, extracted_data: JsonValue) -> Self {
        Self {
            id: EmailId::new(),
            quote_id,
            raw_text: raw_text.into(),
            extracted_data,
            received_at: Utc::now(),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Email {
    pub async fn insert(&self, conn: &mut PgConnection) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Email>(
            r#"
            INSERT INTO emails (id, quote_id, raw_text, extracted_data, received_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.quote_id)
        .bind(&self.raw_text)
        .bind(&self.extracted_data)
        .bind(self.received_at)
        .fetch_one(&mut *conn)
        .await
    }

    /// Audit trail for a quote, oldest first
    pub async fn find_for_quote(quote_id: QuoteId, conn: &mut PgConnection) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Email>(
            "SELECT * FROM emails WHERE quote_id = $1 ORDER BY received_at, id",
        )
        .bind(quote_id)
        .fetch_all(&mut *conn)
        .await
    }
}
