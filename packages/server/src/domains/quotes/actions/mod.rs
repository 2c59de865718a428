//! Quote domain actions - email reconciliation, queries and clarification drafts
//!
//! Step functions take `&mut dyn StoreTx` so the coordinator in
//! `process_email` decides when the transaction commits.

mod clarification;
pub(crate) mod error;
mod log_email;
mod process_email;
mod queries;
mod upsert_quote;

pub use clarification::{
    clarification_prompt, draft_clarification_email, missing_items, ClarificationError,
};
pub use error::{ProcessEmailError, QuoteError};
pub use log_email::log_email;
pub use process_email::{process_email, reconcile_candidate};
pub use queries::{list_quotes, quote_emails};
pub(crate) use queries::{certification_names_by_quote, suppliers_for_quotes};
pub use upsert_quote::{upsert_quote, QuoteFields, UpsertedQuote};
