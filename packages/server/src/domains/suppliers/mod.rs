// Supplier domain - companies that answer RFQs
//
// Suppliers are identified by contact email. Email reconciliation creates them
// but never edits them; edits go through the explicit management actions.

pub mod actions;
pub mod data;
pub mod models;

pub use data::{SupplierRecord, SupplierSummary};
pub use models::{Supplier, SupplierUpdate};
