// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Reconciliation rules live in the domain actions, which talk to storage and
// the LLM exclusively through these seams.
//
// Naming convention: Base* for service traits (e.g., BaseStore, BaseAI)

use anyhow::Result;
use async_trait::async_trait;

use super::errors::{ExtractionError, StoreResult};
use crate::common::{
    CertificationId, ExtractedQuote, QuoteId, RfqId, SupplierId,
};
use crate::domains::certifications::models::Certification;
use crate::domains::quotes::models::{Email, Quote};
use crate::domains::rfqs::models::Rfq;
use crate::domains::suppliers::models::Supplier;

// =============================================================================
// Storage port
// =============================================================================

/// Entry point to the relational store. Every unit of work runs inside one
/// transaction obtained from `begin`.
#[async_trait]
pub trait BaseStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// One open transaction against the store.
///
/// Dropping a `StoreTx` without calling `commit` discards every write made
/// through it. Unique constraints (supplier email, supplier company name,
/// certification name, quote (supplier, rfq) pair) are enforced by the
/// implementation and reported as `StoreError::Conflict`.
#[async_trait]
pub trait StoreTx: Send {
    // --- suppliers -----------------------------------------------------------
    async fn find_supplier(&mut self, id: SupplierId) -> StoreResult<Option<Supplier>>;
    async fn find_supplier_by_email(&mut self, email: &str) -> StoreResult<Option<Supplier>>;
    async fn find_suppliers_by_ids(&mut self, ids: &[SupplierId]) -> StoreResult<Vec<Supplier>>;
    async fn list_suppliers(&mut self) -> StoreResult<Vec<Supplier>>;
    async fn insert_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier>;
    async fn update_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier>;

    // --- certifications ------------------------------------------------------
    async fn find_certifications_by_names(&mut self, names: &[String]) -> StoreResult<Vec<Certification>>;
    async fn insert_certification(&mut self, certification: &Certification) -> StoreResult<Certification>;
    async fn certifications_for_quotes(
        &mut self,
        quote_ids: &[QuoteId],
    ) -> StoreResult<Vec<(QuoteId, Certification)>>;
    async fn certifications_for_rfqs(
        &mut self,
        rfq_ids: &[RfqId],
    ) -> StoreResult<Vec<(RfqId, Certification)>>;

    // --- rfqs ----------------------------------------------------------------
    async fn find_rfq(&mut self, id: RfqId) -> StoreResult<Option<Rfq>>;
    async fn find_rfqs_by_ids(&mut self, ids: &[RfqId]) -> StoreResult<Vec<Rfq>>;
    async fn list_rfqs(&mut self) -> StoreResult<Vec<Rfq>>;
    async fn insert_rfq(&mut self, rfq: &Rfq) -> StoreResult<Rfq>;
    async fn link_rfq_certifications(
        &mut self,
        rfq_id: RfqId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()>;

    // --- quotes --------------------------------------------------------------
    async fn find_quote(&mut self, id: QuoteId) -> StoreResult<Option<Quote>>;
    /// Row-locks the quote for the rest of the transaction.
    async fn find_quote_for_pair(
        &mut self,
        supplier_id: SupplierId,
        rfq_id: RfqId,
    ) -> StoreResult<Option<Quote>>;
    /// Quotes newest first, optionally restricted to one RFQ.
    async fn list_quotes(&mut self, rfq_id: Option<RfqId>) -> StoreResult<Vec<Quote>>;
    async fn insert_quote(&mut self, quote: &Quote) -> StoreResult<Quote>;
    async fn update_quote_terms(&mut self, quote: &Quote) -> StoreResult<Quote>;
    async fn replace_quote_certifications(
        &mut self,
        quote_id: QuoteId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()>;

    // --- email audit log (append-only) ---------------------------------------
    async fn insert_email(&mut self, email: &Email) -> StoreResult<Email>;
    async fn emails_for_quote(&mut self, quote_id: QuoteId) -> StoreResult<Vec<Email>>;

    // --- transaction control -------------------------------------------------
    async fn commit(self: Box<Self>) -> StoreResult<()>;
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

// =============================================================================
// Extraction gateway (Infrastructure - raw text to candidate record)
// =============================================================================

#[async_trait]
pub trait BaseQuoteExtractor: Send + Sync {
    /// Turn raw supplier email text into a candidate quote record.
    ///
    /// Called once per request, before any transaction opens; never retried.
    async fn extract_quote(&self, raw_text: &str) -> Result<ExtractedQuote, ExtractionError>;
}

// =============================================================================
// AI Trait (Infrastructure - free-text generation)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> Result<String>;
}
