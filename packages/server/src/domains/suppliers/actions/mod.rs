//! Supplier domain actions

mod manage;
mod resolve_supplier;

pub use manage::{create_supplier, list_suppliers, update_supplier, NewSupplier, SupplierError};
pub use resolve_supplier::{placeholder_company_name, resolve_supplier, ResolveSupplierError};
