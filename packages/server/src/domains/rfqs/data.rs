use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::RfqId;
use crate::domains::rfqs::models::Rfq;

/// RFQ with the names of its required certifications (sorted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqRecord {
    pub id: RfqId,
    pub item: String,
    pub due_date: Option<DateTime<Utc>>,
    pub amount_required_lbs: Option<f64>,
    pub ship_to_location: Option<String>,
    pub required_certifications: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RfqRecord {
    pub fn new(rfq: Rfq, required_certifications: Vec<String>) -> Self {
        Self {
            id: rfq.id,
            item: rfq.item,
            due_date: rfq.due_date,
            amount_required_lbs: rfq.amount_required_lbs,
            ship_to_location: rfq.ship_to_location,
            required_certifications,
            created_at: rfq.created_at,
        }
    }
}

/// Minimal RFQ reference nested inside quote listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfqSummary {
    pub id: RfqId,
    pub item: String,
}

impl From<Rfq> for RfqSummary {
    fn from(rfq: Rfq) -> Self {
        Self {
            id: rfq.id,
            item: rfq.item,
        }
    }
}
