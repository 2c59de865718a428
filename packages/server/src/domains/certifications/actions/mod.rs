//! Certification domain actions

mod reconcile;

pub use reconcile::{distinct_names, reconcile_certifications};
