//! In-memory implementation of the storage port.
//!
//! Used by tests and local dry runs. Transactions are serialized: `begin`
//! takes an exclusive lock on the committed state and works on a private copy,
//! so `commit` publishes every write at once and dropping the transaction
//! discards them. The same unique and foreign-key constraints as the Postgres
//! schema are enforced, and single faults can be injected per operation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::errors::{StoreError, StoreResult};
use super::traits::{BaseStore, StoreTx};
use crate::common::{CertificationId, QuoteId, RfqId, SupplierId};
use crate::domains::certifications::models::Certification;
use crate::domains::quotes::models::{Email, Quote};
use crate::domains::rfqs::models::Rfq;
use crate::domains::suppliers::models::Supplier;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    suppliers: BTreeMap<SupplierId, Supplier>,
    certifications: BTreeMap<CertificationId, Certification>,
    rfqs: BTreeMap<RfqId, Rfq>,
    rfq_certifications: BTreeSet<(RfqId, CertificationId)>,
    quotes: BTreeMap<QuoteId, Quote>,
    quote_certifications: BTreeSet<(QuoteId, CertificationId)>,
    emails: Vec<Email>,
}

/// Operations that can have a fault injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    InsertSupplier,
    InsertCertification,
    InsertQuote,
    UpdateQuote,
    ReplaceQuoteCertifications,
    InsertEmail,
    Commit,
}

/// A one-shot failure returned by the next matching operation.
#[derive(Debug, Clone)]
pub enum InjectedFault {
    Conflict(String),
    Internal(String),
}

impl InjectedFault {
    fn into_error(self) -> StoreError {
        match self {
            InjectedFault::Conflict(constraint) => StoreError::Conflict { constraint },
            InjectedFault::Internal(message) => StoreError::Internal(message),
        }
    }
}

/// Row counts per table, for assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub suppliers: usize,
    pub certifications: usize,
    pub rfqs: usize,
    pub rfq_certifications: usize,
    pub quotes: usize,
    pub quote_certifications: usize,
    pub emails: usize,
}

type Faults = Arc<Mutex<Vec<(StoreOp, InjectedFault)>>>;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<AsyncMutex<MemoryState>>,
    faults: Faults,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `op` fail with `fault`.
    pub fn inject_fault(&self, op: StoreOp, fault: InjectedFault) {
        self.faults.lock().unwrap().push((op, fault));
    }

    /// Committed state, or an error while a transaction is open.
    ///
    /// `begin` holds the state lock until the transaction ends, so waiting
    /// here from the task that owns the transaction would never return.
    fn committed(&self) -> StoreResult<tokio::sync::MutexGuard<'_, MemoryState>> {
        self.state.try_lock().map_err(|_| {
            StoreError::Internal("in-memory store has an open transaction".to_string())
        })
    }

    pub fn counts(&self) -> StoreResult<TableCounts> {
        let state = self.committed()?;
        Ok(TableCounts {
            suppliers: state.suppliers.len(),
            certifications: state.certifications.len(),
            rfqs: state.rfqs.len(),
            rfq_certifications: state.rfq_certifications.len(),
            quotes: state.quotes.len(),
            quote_certifications: state.quote_certifications.len(),
            emails: state.emails.len(),
        })
    }

    /// Committed certification names, sorted.
    pub fn certification_names(&self) -> StoreResult<Vec<String>> {
        let state = self.committed()?;
        let mut names: Vec<String> = state
            .certifications
            .values()
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Committed audit emails in insertion order.
    pub fn emails(&self) -> StoreResult<Vec<Email>> {
        Ok(self.committed()?.emails.clone())
    }
}

#[async_trait]
impl BaseStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let committed = self.state.clone().lock_owned().await;
        let working = committed.clone();
        Ok(Box::new(InMemoryStoreTx {
            committed,
            working,
            faults: self.faults.clone(),
        }))
    }
}

pub struct InMemoryStoreTx {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Faults,
}

impl InMemoryStoreTx {
    fn check_fault(&self, op: StoreOp) -> StoreResult<()> {
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|(o, _)| *o == op) {
            Some(index) => Err(faults.remove(index).1.into_error()),
            None => Ok(()),
        }
    }

    fn check_supplier_unique(&self, supplier: &Supplier) -> StoreResult<()> {
        for existing in self.working.suppliers.values().filter(|s| s.id != supplier.id) {
            if existing.contact_email == supplier.contact_email {
                return Err(conflict("suppliers_contact_email_key"));
            }
            if existing.company_name == supplier.company_name {
                return Err(conflict("suppliers_company_name_key"));
            }
        }
        Ok(())
    }

    fn check_certifications_exist(&self, ids: &[CertificationId]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.working.certifications.contains_key(id)) {
            Some(missing) => Err(foreign_key("certification", missing)),
            None => Ok(()),
        }
    }
}

fn conflict(constraint: &str) -> StoreError {
    StoreError::Conflict {
        constraint: constraint.to_string(),
    }
}

fn foreign_key(table: &str, id: &impl std::fmt::Display) -> StoreError {
    StoreError::Internal(format!("foreign key violation: no {} with id {}", table, id))
}

#[async_trait]
impl StoreTx for InMemoryStoreTx {
    async fn find_supplier(&mut self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        Ok(self.working.suppliers.get(&id).cloned())
    }

    async fn find_supplier_by_email(&mut self, email: &str) -> StoreResult<Option<Supplier>> {
        Ok(self
            .working
            .suppliers
            .values()
            .find(|s| s.contact_email == email)
            .cloned())
    }

    async fn find_suppliers_by_ids(&mut self, ids: &[SupplierId]) -> StoreResult<Vec<Supplier>> {
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| self.working.suppliers.get(id).cloned())
            .collect())
    }

    async fn list_suppliers(&mut self) -> StoreResult<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self.working.suppliers.values().cloned().collect();
        suppliers.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(suppliers)
    }

    async fn insert_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier> {
        self.check_fault(StoreOp::InsertSupplier)?;
        if self.working.suppliers.contains_key(&supplier.id) {
            return Err(conflict("suppliers_pkey"));
        }
        self.check_supplier_unique(supplier)?;
        self.working.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier.clone())
    }

    async fn update_supplier(&mut self, supplier: &Supplier) -> StoreResult<Supplier> {
        if !self.working.suppliers.contains_key(&supplier.id) {
            return Err(StoreError::NotFound);
        }
        self.check_supplier_unique(supplier)?;
        let mut updated = supplier.clone();
        updated.updated_at = Utc::now();
        self.working.suppliers.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn find_certifications_by_names(&mut self, names: &[String]) -> StoreResult<Vec<Certification>> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        Ok(self
            .working
            .certifications
            .values()
            .filter(|c| wanted.contains(c.name.as_str()))
            .cloned()
            .collect())
    }

    async fn insert_certification(&mut self, certification: &Certification) -> StoreResult<Certification> {
        self.check_fault(StoreOp::InsertCertification)?;
        if self
            .working
            .certifications
            .values()
            .any(|c| c.id == certification.id || c.name == certification.name)
        {
            return Err(conflict("certifications_name_key"));
        }
        self.working
            .certifications
            .insert(certification.id, certification.clone());
        Ok(certification.clone())
    }

    async fn certifications_for_quotes(
        &mut self,
        quote_ids: &[QuoteId],
    ) -> StoreResult<Vec<(QuoteId, Certification)>> {
        let wanted: HashSet<&QuoteId> = quote_ids.iter().collect();
        let mut rows: Vec<(QuoteId, Certification)> = self
            .working
            .quote_certifications
            .iter()
            .filter(|(quote_id, _)| wanted.contains(quote_id))
            .filter_map(|(quote_id, cert_id)| {
                self.working
                    .certifications
                    .get(cert_id)
                    .map(|c| (*quote_id, c.clone()))
            })
            .collect();
        rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(rows)
    }

    async fn certifications_for_rfqs(
        &mut self,
        rfq_ids: &[RfqId],
    ) -> StoreResult<Vec<(RfqId, Certification)>> {
        let wanted: HashSet<&RfqId> = rfq_ids.iter().collect();
        let mut rows: Vec<(RfqId, Certification)> = self
            .working
            .rfq_certifications
            .iter()
            .filter(|(rfq_id, _)| wanted.contains(rfq_id))
            .filter_map(|(rfq_id, cert_id)| {
                self.working
                    .certifications
                    .get(cert_id)
                    .map(|c| (*rfq_id, c.clone()))
            })
            .collect();
        rows.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(rows)
    }

    async fn find_rfq(&mut self, id: RfqId) -> StoreResult<Option<Rfq>> {
        Ok(self.working.rfqs.get(&id).cloned())
    }

    async fn find_rfqs_by_ids(&mut self, ids: &[RfqId]) -> StoreResult<Vec<Rfq>> {
        Ok(ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| self.working.rfqs.get(id).cloned())
            .collect())
    }

    async fn list_rfqs(&mut self) -> StoreResult<Vec<Rfq>> {
        let mut rfqs: Vec<Rfq> = self.working.rfqs.values().cloned().collect();
        rfqs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rfqs)
    }

    async fn insert_rfq(&mut self, rfq: &Rfq) -> StoreResult<Rfq> {
        if self.working.rfqs.contains_key(&rfq.id) {
            return Err(conflict("rfqs_pkey"));
        }
        self.working.rfqs.insert(rfq.id, rfq.clone());
        Ok(rfq.clone())
    }

    async fn link_rfq_certifications(
        &mut self,
        rfq_id: RfqId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()> {
        if !self.working.rfqs.contains_key(&rfq_id) {
            return Err(foreign_key("rfq", &rfq_id));
        }
        self.check_certifications_exist(certification_ids)?;
        for cert_id in certification_ids {
            self.working.rfq_certifications.insert((rfq_id, *cert_id));
        }
        Ok(())
    }

    async fn find_quote(&mut self, id: QuoteId) -> StoreResult<Option<Quote>> {
        Ok(self.working.quotes.get(&id).cloned())
    }

    async fn find_quote_for_pair(
        &mut self,
        supplier_id: SupplierId,
        rfq_id: RfqId,
    ) -> StoreResult<Option<Quote>> {
        Ok(self
            .working
            .quotes
            .values()
            .find(|q| q.supplier_id == supplier_id && q.rfq_id == rfq_id)
            .cloned())
    }

    async fn list_quotes(&mut self, rfq_id: Option<RfqId>) -> StoreResult<Vec<Quote>> {
        let mut quotes: Vec<Quote> = self
            .working
            .quotes
            .values()
            .filter(|q| rfq_id.map_or(true, |id| q.rfq_id == id))
            .cloned()
            .collect();
        quotes.sort_by(|a, b| {
            b.date_submitted
                .cmp(&a.date_submitted)
                .then(b.id.cmp(&a.id))
        });
        Ok(quotes)
    }

    async fn insert_quote(&mut self, quote: &Quote) -> StoreResult<Quote> {
        self.check_fault(StoreOp::InsertQuote)?;
        if !self.working.suppliers.contains_key(&quote.supplier_id) {
            return Err(foreign_key("supplier", &quote.supplier_id));
        }
        if !self.working.rfqs.contains_key(&quote.rfq_id) {
            return Err(foreign_key("rfq", &quote.rfq_id));
        }
        if self.working.quotes.contains_key(&quote.id) {
            return Err(conflict("quotes_pkey"));
        }
        if self
            .working
            .quotes
            .values()
            .any(|q| q.supplier_id == quote.supplier_id && q.rfq_id == quote.rfq_id)
        {
            return Err(conflict("quotes_supplier_rfq_key"));
        }
        self.working.quotes.insert(quote.id, quote.clone());
        Ok(quote.clone())
    }

    async fn update_quote_terms(&mut self, quote: &Quote) -> StoreResult<Quote> {
        self.check_fault(StoreOp::UpdateQuote)?;
        let stored = self
            .working
            .quotes
            .get_mut(&quote.id)
            .ok_or(StoreError::NotFound)?;
        stored.price_per_pound = quote.price_per_pound;
        stored.country_of_origin = quote.country_of_origin.clone();
        stored.min_order_quantity = quote.min_order_quantity;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn replace_quote_certifications(
        &mut self,
        quote_id: QuoteId,
        certification_ids: &[CertificationId],
    ) -> StoreResult<()> {
        self.check_fault(StoreOp::ReplaceQuoteCertifications)?;
        if !self.working.quotes.contains_key(&quote_id) {
            return Err(foreign_key("quote", &quote_id));
        }
        self.check_certifications_exist(certification_ids)?;
        self.working
            .quote_certifications
            .retain(|(q, _)| *q != quote_id);
        for cert_id in certification_ids {
            self.working.quote_certifications.insert((quote_id, *cert_id));
        }
        Ok(())
    }

    async fn insert_email(&mut self, email: &Email) -> StoreResult<Email> {
        self.check_fault(StoreOp::InsertEmail)?;
        if !self.working.quotes.contains_key(&email.quote_id) {
            return Err(foreign_key("quote", &email.quote_id));
        }
        if self.working.emails.iter().any(|e| e.id == email.id) {
            return Err(conflict("emails_pkey"));
        }
        self.working.emails.push(email.clone());
        Ok(email.clone())
    }

    async fn emails_for_quote(&mut self, quote_id: QuoteId) -> StoreResult<Vec<Email>> {
        Ok(self
            .working
            .emails
            .iter()
            .filter(|e| e.quote_id == quote_id)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.check_fault(StoreOp::Commit)?;
        let InMemoryStoreTx {
            mut committed,
            working,
            ..
        } = *self;
        *committed = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
