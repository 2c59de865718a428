//! Postgres implementation of the storage port.
//!
//! Thin adapter: every method delegates to the SQL in `domains/*/models` and
//! converts `sqlx::Error` into `StoreError` (unique violations become
//! `StoreError::Conflict`).

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::errors::StoreResult;
use super::traits::{BaseStore, StoreTx};
use crate::common::{CertificationId, QuoteId, RfqId, SupplierId};
use crate::domains::certifications::models::Certification;
use crate::domains::quotes::models::{Email, Quote};
use crate::domains::rfqs::models::Rfq;
use crate::domains::suppliers::models::Supplier;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

/// An open Postgres transaction. Rolled back by sqlx if dropped uncommitted.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn find_supplier(&mut self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        Ok(Supplier::find_by_id(id, &mut self.tx).await?)
    }

    async fn find_supplier_by_email(&mut self, email: &str) -> StoreResult<Option<Supplier>> {
        Ok(Supplier::find_by_email(email, &mut self.tx).await?)
    }

    async fn find_suppliers_by_ids(&mut self, ids: &[SupplierId]) -> StoreResult<Vec<Supplier>> {
        Ok(Supplier::find_by_ids(ids, &mut self.tx).await?)
    }

    async fn list_suppliers(&mut self) -> StoreResult<Vec<Supplier>> {
        Ok(Supplier::find_all(&mut self.tx).await?)
    }

    async fn insert_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier> {
        Ok(supplier.insert(&mut self.tx).await?)
    }

    async fn update_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier> {
        Ok(supplier.update(&mut self.tx).await?)
    }

    async fn find_certifications_by_names(&mut self, names: &[String]) -> StoreResult<Vec<Certification>> {
        Ok(Certification::find_by_names(names, &mut self.tx).await?)
    }

    async fn insert_certification(&mut self, certification: &Certification) -> StoreResult<Certification> {
        Ok(certification.insert(&mut self.tx).await?)
    }

    async fn certifications_for_quotes(
        &mut self,
        quote_ids: &[QuoteId],
    ) -> StoreResult<Vec<(QuoteId, Certification)>> {
        let rows = Certification::find_for_quote_ids(quote_ids, &mut self.tx).await?;
        Ok(rows.into_iter().map(|r| (r.quote_id, r.certification)).collect())
    }

    async fn certifications_for_rfqs(
        &mut self,
        rfq_ids: &[RfqId],
    ) -> StoreResult<Vec<(RfqId, Certification)>> {
        let rows = Certification::find_for_rfq_ids(rfq_ids, &mut self.tx).await?;
        Ok(rows.into_iter().map(|r| (r.rfq_id, r.certification)).collect())
    }

    async fn find_rfq(&mut self, id: RfqId) -> StoreResult<Option<Rfq>> {
        Ok(Rfq::find_by_id(id, &mut self.tx).await?)
    }

    async fn find_rfqs_by_ids(&mut self, ids: &[RfqId]) -> StoreResult<Vec<Rfq>> {
        Ok(Rfq::find_by_ids(ids, &mut self.tx).await?)
    }

    async fn list_rfqs(&mut self) -> StoreResult<Vec<Rfq>> {
        Ok(Rfq::find_all(&mut self.tx).await?)
    }

    async fn insert_rfq(&mut self, rfq: &Rfq) -> StoreResult<Rfq> {
        Ok(rfq.insert(&mut self.tx).await?)
    }

    async fn link_rfq_certifications(
        &mut self,
        rfq_id: RfqId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()> {
        Ok(Rfq::link_certifications(rfq_id, certification_ids, &mut self.tx).await?)
    }

    async fn find_quote(&mut self, id: QuoteId) -> StoreResult<Option<Quote>> {
        Ok(Quote::find_by_id(id, &mut self.tx).await?)
    }

    async fn find_quote_for_pair(
        &mut self,
        supplier_id: SupplierId,
        rfq_id: RfqId,
    ) -> StoreResult<Option<Quote>> {
        Ok(Quote::find_for_pair(supplier_id, rfq_id, &mut self.tx).await?)
    }

    async fn list_quotes(&mut self, rfq_id: Option<RfqId>) -> StoreResult<Vec<Quote>> {
        Ok(Quote::find_all(rfq_id, &mut self.tx).await?)
    }

    async fn insert_quote(&mut self, quote: &Quote) -> StoreResult<Quote> {
        Ok(quote.insert(&mut self.tx).await?)
    }

    async fn update_quote_terms(&mut self, quote: &Quote) -> StoreResult<Quote> {
        Ok(quote.update_terms(&mut self.tx).await?)
    }

    async fn replace_quote_certifications(
        &mut self,
        quote_id: QuoteId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()> {
        Ok(Quote::replace_certifications(quote_id, certification_ids, &mut self.tx).await?)
    }

    async fn insert_email(&mut self, email: &Email) -> StoreResult<Email> {
        Ok(email.insert(&mut self.tx).await?)
    }

    async fn emails_for_quote(&mut self, quote_id: QuoteId) -> StoreResult<Vec<Email>> {
        Ok(Email::find_for_quote(quote_id, &mut self.tx).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
