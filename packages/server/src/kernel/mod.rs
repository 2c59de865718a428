//! Kernel module - infrastructure ports, adapters and dependencies.

pub mod deps;
pub mod errors;
pub mod memory_store;
pub mod openai;
pub mod pg_store;
pub mod structured_output;
pub mod test_dependencies;
pub mod traits;
pub mod unconfigured_llm;

pub use deps::ServerDeps;
pub use errors::{ExtractionError, StoreError, StoreResult};
pub use memory_store::{InMemoryStore, InjectedFault, StoreOp, TableCounts};
pub use openai::OpenAiClient;
pub use pg_store::PgStore;
pub use structured_output::StructuredOutput;
pub use test_dependencies::{MockAI, MockQuoteExtractor, TestDependencies};
pub use traits::*;
pub use unconfigured_llm::UnconfiguredLlm;
