// Stand-in LLM services for commands that never call the model.
//
// Every call fails as unavailable instead of reaching the network with an
// empty API key.

use anyhow::Result;
use async_trait::async_trait;

use super::errors::ExtractionError;
use super::traits::{BaseAI, BaseQuoteExtractor};
use crate::common::ExtractedQuote;

const NOT_CONFIGURED: &str = "LLM services are not configured for this command";

#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredLlm;

#[async_trait]
impl BaseQuoteExtractor for UnconfiguredLlm {
    async fn extract_quote(&self, _raw_text: &str) -> Result<ExtractedQuote, ExtractionError> {
        Err(ExtractionError::Unavailable(NOT_CONFIGURED.to_string()))
    }
}

#[async_trait]
impl BaseAI for UnconfiguredLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!(NOT_CONFIGURED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_call_is_unavailable() {
        let llm = UnconfiguredLlm;
        assert!(matches!(
            llm.extract_quote("text").await,
            Err(ExtractionError::Unavailable(_))
        ));
        assert!(llm.complete("prompt").await.is_err());
    }
}
