// Supplier Quote Intake - reconciliation core
//
// Turns freeform supplier emails into structured quotes against open RFQs.
// Domain logic lives in domains/*/actions and reaches storage and the LLM only
// through the ports in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
