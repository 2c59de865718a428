//! Test fixtures for candidate records and seeded RFQs.

use rfq_core::common::ExtractedQuote;
use rfq_core::domains::rfqs::actions::{create_rfq, NewRfq};
use rfq_core::domains::rfqs::RfqRecord;
use rfq_core::kernel::ServerDeps;

/// Route tracing output through the test writer. Safe to call repeatedly.
/// Run with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Candidate carrying only a supplier email
pub fn candidate(email: &str) -> ExtractedQuote {
    ExtractedQuote {
        supplier_email: Some(email.to_string()),
        ..Default::default()
    }
}

pub fn cert_names(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|n| n.to_string()).collect())
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Create an RFQ through the real action
pub async fn seed_rfq(deps: &ServerDeps, item: &str, required: &[&str]) -> RfqRecord {
    create_rfq(
        NewRfq {
            item: item.to_string(),
            required_certifications: strings(required),
            ..Default::default()
        },
        deps,
    )
    .await
    .expect("Failed to seed RFQ")
}
