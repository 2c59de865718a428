// OpenAI implementation of the extraction gateway and free-text completion.
//
// This is infrastructure only. What to ask for (prompts for clarification
// drafts) lives in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::errors::ExtractionError;
use super::structured_output::StructuredOutput;
use super::traits::{BaseAI, BaseQuoteExtractor};
use crate::common::ExtractedQuote;
use crate::config::Config;

const EXTRACTION_SYSTEM_PROMPT: &str = "Analyze the following supplier email and extract the \
relevant quote and supplier information. Use null for anything the email does not state. \
Prices are per pound in USD and quantities are in pounds; give numbers only.";

#[derive(Debug, Error)]
enum OpenAiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {reason}")]
    Parse { reason: String, raw: Option<String> },
}

impl From<OpenAiError> for ExtractionError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Network(_) | OpenAiError::Api { .. } => {
                ExtractionError::Unavailable(err.to_string())
            }
            OpenAiError::Parse { reason, raw } => ExtractionError::InvalidOutput { reason, raw },
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

impl Message {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

/// Minimal OpenAI chat-completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    extraction_model: String,
    drafting_model: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            extraction_model: "gpt-4o-mini".to_string(),
            drafting_model: "gpt-4o".to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(
            config.require_openai_api_key()?,
            Duration::from_secs(config.llm_timeout_secs),
        )?
        .with_base_url(&config.openai_base_url)
        .with_models(&config.extraction_model, &config.drafting_model);
        Ok(client)
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, extraction: impl Into<String>, drafting: impl Into<String>) -> Self {
        self.extraction_model = extraction.into();
        self.drafting_model = drafting.into();
        self
    }

    async fn send(&self, request: &ChatRequest) -> std::result::Result<ChatMessage, OpenAiError> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %message, "OpenAI API error");
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| OpenAiError::Parse {
            reason: format!("unreadable response body: {}", e),
            raw: None,
        })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            "OpenAI chat completion"
        );

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| OpenAiError::Parse {
                reason: "response contained no choices".to_string(),
                raw: None,
            })
    }

    /// Strict structured output: the model must answer with JSON matching `T`.
    async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<T, OpenAiError> {
        let request = ChatRequest {
            model: self.extraction_model.clone(),
            messages: vec![Message::system(system_prompt), Message::user(user_prompt)],
            temperature: Some(0.0),
            response_format: Some(ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: T::type_name(),
                    strict: true,
                    schema: T::openai_schema(),
                },
            }),
        };

        let message = self.send(&request).await?;
        if let Some(refusal) = message.refusal {
            return Err(OpenAiError::Parse {
                reason: "model refused to answer".to_string(),
                raw: Some(refusal),
            });
        }
        let content = message.content.ok_or_else(|| OpenAiError::Parse {
            reason: "response had no content".to_string(),
            raw: None,
        })?;

        serde_json::from_str(&content).map_err(|e| OpenAiError::Parse {
            reason: format!("failed to deserialize {}: {}", T::type_name(), e),
            raw: Some(content),
        })
    }
}

#[async_trait]
impl BaseQuoteExtractor for OpenAiClient {
    async fn extract_quote(&self, raw_text: &str) -> std::result::Result<ExtractedQuote, ExtractionError> {
        self.extract::<ExtractedQuote>(EXTRACTION_SYSTEM_PROMPT, raw_text)
            .await
            .map_err(|e| {
                warn!(error = %e, "Quote extraction failed");
                ExtractionError::from(e)
            })
    }
}

#[async_trait]
impl BaseAI for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.drafting_model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: None,
            response_format: None,
        };

        let message = self.send(&request).await?;
        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("OpenAI returned an empty completion"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAiClient::new("sk-test", Duration::from_secs(5))
            .unwrap()
            .with_base_url("https://proxy.internal/v1/")
            .with_models("small", "large");

        assert_eq!(client.base_url, "https://proxy.internal/v1");
        assert_eq!(client.extraction_model, "small");
        assert_eq!(client.drafting_model, "large");
    }

    #[test]
    fn test_parse_errors_become_invalid_output() {
        let err: ExtractionError = OpenAiError::Parse {
            reason: "bad json".to_string(),
            raw: Some("{not json".to_string()),
        }
        .into();
        match err {
            ExtractionError::InvalidOutput { raw, .. } => assert_eq!(raw.as_deref(), Some("{not json")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_api_errors_become_unavailable() {
        let err: ExtractionError = OpenAiError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(matches!(err, ExtractionError::Unavailable(_)));
    }

    #[test]
    fn test_response_with_null_content_deserializes() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null,"refusal":"no"}}]}"#,
        )
        .unwrap();
        assert!(body.choices[0].message.content.is_none());
        assert_eq!(body.choices[0].message.refusal.as_deref(), Some("no"));
    }
}
