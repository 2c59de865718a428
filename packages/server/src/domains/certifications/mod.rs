// Certification domain - named certifications shared by RFQs and quotes
//
// Certifications are created lazily the first time a name is seen, either in
// an RFQ's requirements or in a supplier email.

pub mod actions;
pub mod models;

pub use models::Certification;
