//! RFQ domain actions

mod create_rfq;
pub(crate) mod error;
mod queries;

pub use create_rfq::{create_rfq, NewRfq};
pub use error::RfqError;
pub use queries::{list_rfqs, quotes_for_rfq};
