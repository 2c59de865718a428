// Quote domain - supplier offers against RFQs and their email audit trail
//
// Responsibilities:
// - Reconciling extracted supplier emails into one quote per (supplier, RFQ)
// - Null-preserving merge of quote terms
// - Append-only email log
// - Clarification drafts for incomplete quotes

pub mod actions;
pub mod data;
pub mod models;

pub use data::{ClarificationDraft, EmailRecord, QuoteComparison, QuoteDetails, QuoteRecord};
pub use models::{Email, Quote};
