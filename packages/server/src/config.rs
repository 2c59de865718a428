use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// How a follow-up email's certification list combines with the stored set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificationMergePolicy {
    /// The latest email's list replaces the stored set wholesale, even when empty.
    #[default]
    Replace,
    /// The latest email's list is added to the stored set.
    Union,
}

impl FromStr for CertificationMergePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "union" => Ok(Self::Union),
            other => bail!("unknown certification merge policy '{}' (expected replace or union)", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub extraction_model: String,
    pub drafting_model: String,
    pub llm_timeout_secs: u64,
    pub certification_merge_policy: CertificationMergePolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            extraction_model: env::var("EXTRACTION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            drafting_model: env::var("DRAFTING_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("LLM_TIMEOUT_SECS must be a valid number")?,
            certification_merge_policy: env::var("CERTIFICATION_MERGE_POLICY")
                .unwrap_or_else(|_| "replace".to_string())
                .parse()
                .context("CERTIFICATION_MERGE_POLICY must be replace or union")?,
        })
    }

    /// The OpenAI key, required only by commands that call the model.
    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY must be set")
    }
}
