// RFQ domain - sourcing requests that suppliers quote against
//
// RFQs are created through `create_rfq` and are read-only to email
// reconciliation.

pub mod actions;
pub mod data;
pub mod models;

pub use data::{RfqRecord, RfqSummary};
pub use models::Rfq;
