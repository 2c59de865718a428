//! Server dependencies for domain actions (using traits for testability)
//!
//! Every external service is reached through a trait object so tests can swap
//! in `InMemoryStore` and the mocks from `test_dependencies`.

use std::sync::Arc;

use crate::config::CertificationMergePolicy;
use crate::kernel::{BaseAI, BaseQuoteExtractor, BaseStore};

#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseStore>,
    pub extractor: Arc<dyn BaseQuoteExtractor>,
    /// Free-text LLM used to draft clarification emails.
    pub ai: Arc<dyn BaseAI>,
    pub certification_policy: CertificationMergePolicy,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseStore>,
        extractor: Arc<dyn BaseQuoteExtractor>,
        ai: Arc<dyn BaseAI>,
    ) -> Self {
        Self {
            store,
            extractor,
            ai,
            certification_policy: CertificationMergePolicy::default(),
        }
    }

    pub fn with_certification_policy(mut self, policy: CertificationMergePolicy) -> Self {
        self.certification_policy = policy;
        self
    }
}
