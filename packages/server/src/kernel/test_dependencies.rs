// TestDependencies - mock implementations for testing
//
// Provides mock gateways that can be injected into ServerDeps for tests,
// alongside the in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::errors::ExtractionError;
use super::memory_store::InMemoryStore;
use super::{BaseAI, BaseQuoteExtractor, ServerDeps};
use crate::common::ExtractedQuote;
use crate::config::CertificationMergePolicy;

// =============================================================================
// Mock Quote Extractor
// =============================================================================

/// Returns queued results in order; an empty queue means the service is down.
pub struct MockQuoteExtractor {
    results: Arc<Mutex<Vec<std::result::Result<ExtractedQuote, ExtractionError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockQuoteExtractor {
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful extraction
    pub fn with_quote(self, quote: ExtractedQuote) -> Self {
        self.results.lock().unwrap().push(Ok(quote));
        self
    }

    /// Queue a failed extraction
    pub fn with_error(self, error: ExtractionError) -> Self {
        self.results.lock().unwrap().push(Err(error));
        self
    }

    /// Queue another result on a shared mock
    pub fn push(&self, result: std::result::Result<ExtractedQuote, ExtractionError>) {
        self.results.lock().unwrap().push(result);
    }

    /// Raw texts the extractor was called with
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockQuoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseQuoteExtractor for MockQuoteExtractor {
    async fn extract_quote(&self, raw_text: &str) -> std::result::Result<ExtractedQuote, ExtractionError> {
        self.calls.lock().unwrap().push(raw_text.to_string());

        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            return Err(ExtractionError::Unavailable(
                "no mock extraction queued".to_string(),
            ));
        }
        results.remove(0)
    }
}

// =============================================================================
// Mock AI (free-text drafting)
// =============================================================================

pub struct MockAI {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    /// Make every call fail as if the model were unreachable
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Get all prompts that were sent to the AI
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last prompt sent to the AI
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if self.fail {
            anyhow::bail!("mock AI unavailable");
        }

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            Ok(responses.remove(0))
        } else {
            Ok("Mock AI response".to_string())
        }
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: InMemoryStore,
    pub extractor: Arc<MockQuoteExtractor>,
    pub ai: Arc<MockAI>,
    pub certification_policy: CertificationMergePolicy,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            extractor: Arc::new(MockQuoteExtractor::new()),
            ai: Arc::new(MockAI::new()),
            certification_policy: CertificationMergePolicy::default(),
        }
    }

    /// Set a mock extractor
    pub fn mock_extractor(mut self, extractor: MockQuoteExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    pub fn certification_policy(mut self, policy: CertificationMergePolicy) -> Self {
        self.certification_policy = policy;
        self
    }

    /// Build ServerDeps sharing this instance's store and mocks
    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            Arc::new(self.store.clone()),
            self.extractor.clone(),
            self.ai.clone(),
        )
        .with_certification_policy(self.certification_policy)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
