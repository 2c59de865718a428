//! Typed ID definitions for all domain entities.

use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Supplier entities.
pub struct SupplierEntity;

/// Marker type for Certification entities.
pub struct CertificationEntity;

/// Marker type for RFQ entities (requests for quote).
pub struct RfqEntity;

/// Marker type for Quote entities.
pub struct QuoteEntity;

/// Marker type for audited Email entities.
pub struct EmailEntity;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type SupplierId = Id<SupplierEntity>;

pub type CertificationId = Id<CertificationEntity>;

pub type RfqId = Id<RfqEntity>;

pub type QuoteId = Id<QuoteEntity>;

pub type EmailId = Id<EmailEntity>;
