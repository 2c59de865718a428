//! Command-line boundary for the quote intake service.
//!
//! Prints results as pretty JSON on stdout; logs go to stderr.
//! Exit codes: 0 success, 2 caller error, 75 retryable conflict, 1 anything else.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rfq_core::common::{QuoteId, RfqId, SupplierId};
use rfq_core::config::Config;
use rfq_core::domains::quotes::actions as quotes;
use rfq_core::domains::rfqs::actions::{self as rfqs, NewRfq};
use rfq_core::domains::suppliers::actions::{self as suppliers, NewSupplier};
use rfq_core::domains::suppliers::SupplierUpdate;
use rfq_core::kernel::{
    BaseAI, BaseQuoteExtractor, OpenAiClient, PgStore, ServerDeps, UnconfiguredLlm,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_CALLER_ERROR: u8 = 2;
const EXIT_RETRYABLE: u8 = 75;

#[derive(Parser)]
#[command(name = "rfq_cli")]
#[command(about = "Supplier quote intake: RFQs, suppliers and email reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,

    /// Open a new RFQ
    CreateRfq {
        #[arg(long)]
        item: String,
        /// RFC 3339 timestamp
        #[arg(long)]
        due_date: Option<DateTime<Utc>>,
        #[arg(long)]
        amount_lbs: Option<f64>,
        #[arg(long)]
        ship_to: Option<String>,
        /// Required certification (repeatable)
        #[arg(long = "cert")]
        certifications: Vec<String>,
    },

    /// List RFQs, newest first
    ListRfqs,

    /// Compare all quotes submitted against an RFQ
    RfqQuotes { rfq_id: RfqId },

    /// Extract and reconcile a supplier email against an RFQ
    ProcessEmail {
        rfq_id: RfqId,
        /// Read the email from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List all quotes, newest first
    ListQuotes,

    /// Show the audit emails behind a quote
    QuoteEmails { quote_id: QuoteId },

    /// Create a supplier by hand
    CreateSupplier {
        #[arg(long)]
        company_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        payment_terms: Option<String>,
    },

    /// List suppliers by company name
    ListSuppliers,

    /// Update supplier fields; omitted fields are left alone
    UpdateSupplier {
        supplier_id: SupplierId,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        contact_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        payment_terms: Option<String>,
    },

    /// Draft an email asking a supplier for what their quote is missing
    Clarify { quote_id: QuoteId },
}

impl Commands {
    fn needs_llm(&self) -> bool {
        matches!(self, Commands::ProcessEmail { .. } | Commands::Clarify { .. })
    }
}

/// A failed command, classified for the exit code.
struct Failure {
    message: String,
    code: u8,
}

impl Failure {
    fn classify(message: impl ToString, caller_error: bool, retryable: bool) -> Self {
        let code = if retryable {
            EXIT_RETRYABLE
        } else if caller_error {
            EXIT_CALLER_ERROR
        } else {
            1
        };
        Self {
            message: message.to_string(),
            code,
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: format!("{:#}", err),
            code: 1,
        }
    }
}

macro_rules! classified {
    ($result:expr) => {
        $result.map_err(|e| Failure::classify(&e, e.is_caller_error(), e.is_retryable()))
    };
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Failure> {
    Ok(serde_json::to_string_pretty(value).context("failed to render output")?)
}

fn read_email(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read email from stdin")?;
            Ok(text)
        }
    }
}

/// The OpenAI client for commands that call the model; a stand-in otherwise,
/// so the rest run without `OPENAI_API_KEY`.
fn llm_services(
    needs_llm: bool,
    config: &Config,
) -> Result<(Arc<dyn BaseQuoteExtractor>, Arc<dyn BaseAI>)> {
    let (extractor, ai): (Arc<dyn BaseQuoteExtractor>, Arc<dyn BaseAI>) = if needs_llm {
        let client = Arc::new(OpenAiClient::from_config(config)?);
        (client.clone(), client)
    } else {
        (Arc::new(UnconfiguredLlm), Arc::new(UnconfiguredLlm))
    };
    Ok((extractor, ai))
}

async fn run(command: Commands, config: Config) -> Result<String, Failure> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let (extractor, ai) = llm_services(command.needs_llm(), &config)?;
    let deps = ServerDeps::new(Arc::new(PgStore::new(pool.clone())), extractor, ai)
        .with_certification_policy(config.certification_merge_policy);

    match command {
        Commands::Migrate => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("Migrations applied");
            to_json(&serde_json::json!({ "migrated": true }))
        }
        Commands::CreateRfq {
            item,
            due_date,
            amount_lbs,
            ship_to,
            certifications,
        } => {
            let input = NewRfq {
                item,
                due_date,
                amount_required_lbs: amount_lbs,
                ship_to_location: ship_to,
                required_certifications: certifications,
            };
            to_json(&classified!(rfqs::create_rfq(input, &deps).await)?)
        }
        Commands::ListRfqs => to_json(&classified!(rfqs::list_rfqs(&deps).await)?),
        Commands::RfqQuotes { rfq_id } => {
            to_json(&classified!(rfqs::quotes_for_rfq(rfq_id, &deps).await)?)
        }
        Commands::ProcessEmail { rfq_id, file } => {
            let raw_text = read_email(file)?;
            let record = quotes::process_email(rfq_id, &raw_text, &deps)
                .await
                .map_err(|e| {
                    if let Some(detail) = e.diagnostic() {
                        tracing::error!(detail = %detail, "Extraction diagnostics");
                    }
                    Failure::classify(&e, e.is_caller_error(), e.is_retryable())
                })?;
            to_json(&record)
        }
        Commands::ListQuotes => to_json(&classified!(quotes::list_quotes(&deps).await)?),
        Commands::QuoteEmails { quote_id } => {
            to_json(&classified!(quotes::quote_emails(quote_id, &deps).await)?)
        }
        Commands::CreateSupplier {
            company_name,
            email,
            contact_name,
            phone,
            address,
            payment_terms,
        } => {
            let input = NewSupplier {
                company_name,
                contact_email: email,
                contact_name,
                contact_phone: phone,
                hq_address: address,
                payment_terms,
            };
            to_json(&classified!(suppliers::create_supplier(input, &deps).await)?)
        }
        Commands::ListSuppliers => to_json(&classified!(suppliers::list_suppliers(&deps).await)?),
        Commands::UpdateSupplier {
            supplier_id,
            company_name,
            email,
            contact_name,
            phone,
            address,
            payment_terms,
        } => {
            let update = SupplierUpdate {
                company_name,
                contact_email: email,
                contact_name,
                contact_phone: phone,
                hq_address: address,
                payment_terms,
            };
            to_json(&classified!(
                suppliers::update_supplier(supplier_id, update, &deps).await
            )?)
        }
        Commands::Clarify { quote_id } => to_json(&classified!(
            quotes::draft_clarification_email(quote_id, &deps).await
        )?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rfq_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, config).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_key() -> Config {
        Config {
            database_url: "postgres://localhost/rfq".to_string(),
            database_max_connections: 1,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            extraction_model: "gpt-4o-mini".to_string(),
            drafting_model: "gpt-4o".to_string(),
            llm_timeout_secs: 30,
            certification_merge_policy: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_non_llm_commands_get_unconfigured_services() {
        let (extractor, ai) = llm_services(false, &config_without_key()).unwrap();
        assert!(extractor.extract_quote("text").await.is_err());
        assert!(ai.complete("prompt").await.is_err());
    }

    #[test]
    fn test_llm_commands_require_api_key() {
        assert!(llm_services(true, &config_without_key()).is_err());
        assert!(Commands::Clarify {
            quote_id: QuoteId::new()
        }
        .needs_llm());
        assert!(!Commands::Migrate.needs_llm());
    }
}
