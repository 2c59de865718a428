use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::common::{EmailId, QuoteId, RfqId, SupplierId};
use crate::domains::quotes::models::{Email, Quote};
use crate::domains::rfqs::data::RfqSummary;
use crate::domains::suppliers::data::SupplierSummary;

/// Quote as returned after processing an email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: QuoteId,
    pub supplier_id: SupplierId,
    pub rfq_id: RfqId,
    pub price_per_pound: Option<f64>,
    pub country_of_origin: Option<String>,
    pub min_order_quantity: Option<i64>,
    /// Certification names, sorted
    pub certifications: Vec<String>,
    pub date_submitted: DateTime<Utc>,
}

impl QuoteRecord {
    pub fn new(quote: Quote, mut certifications: Vec<String>) -> Self {
        certifications.sort();
        Self {
            id: quote.id,
            supplier_id: quote.supplier_id,
            rfq_id: quote.rfq_id,
            price_per_pound: quote.price_per_pound,
            country_of_origin: quote.country_of_origin,
            min_order_quantity: quote.min_order_quantity,
            certifications,
            date_submitted: quote.date_submitted,
        }
    }
}

/// One row of an RFQ's comparison view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteComparison {
    #[serde(flatten)]
    pub quote: QuoteRecord,
    pub supplier: SupplierSummary,
}

/// One row of the master quote list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDetails {
    #[serde(flatten)]
    pub quote: QuoteRecord,
    pub supplier: SupplierSummary,
    pub rfq: RfqSummary,
}

/// Audit email as shown in a quote's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: EmailId,
    pub quote_id: QuoteId,
    pub raw_text: String,
    pub extracted_data: JsonValue,
    pub received_at: DateTime<Utc>,
}

impl From<Email> for EmailRecord {
    fn from(email: Email) -> Self {
        Self {
            id: email.id,
            quote_id: email.quote_id,
            raw_text: email.raw_text,
            extracted_data: email.extracted_data,
            received_at: email.received_at,
        }
    }
}

/// Drafted clarification email for a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationDraft {
    pub quote_id: QuoteId,
    pub missing_items: Vec<String>,
    pub email_text: String,
}
