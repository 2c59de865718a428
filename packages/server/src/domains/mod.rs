// Business domains
pub mod certifications;
pub mod quotes;
pub mod rfqs;
pub mod suppliers;
