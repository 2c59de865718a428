// Common types shared across the kernel and domain layers

pub mod entity_ids;
pub mod extraction_types;
pub mod id;

pub use entity_ids::*;
pub use extraction_types::ExtractedQuote;
pub use id::Id;
