use thiserror::Error;

use crate::common::{QuoteId, RfqId};
use crate::kernel::{ExtractionError, StoreError};

/// Caller-facing failures of email processing.
///
/// Nothing is persisted when any of these is returned.
#[derive(Debug, Error)]
pub enum ProcessEmailError {
    #[error("RFQ {0} not found")]
    RfqNotFound(RfqId),

    #[error("extraction service unavailable")]
    GatewayUnavailable(String),

    /// `raw` is the model output that failed to parse, kept for operators.
    #[error("extraction service returned an invalid payload")]
    GatewayInvalidOutput { reason: String, raw: Option<String> },

    #[error("could not identify a supplier email in the text")]
    MissingIdentifier,

    #[error("conflicting concurrent write ({constraint}), retry the request")]
    StorageConflict { constraint: String },

    #[error("internal failure")]
    InternalFailure,
}

impl ProcessEmailError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessEmailError::StorageConflict { .. })
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ProcessEmailError::MissingIdentifier | ProcessEmailError::RfqNotFound(_)
        )
    }

    /// Operator diagnostics for gateway failures.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ProcessEmailError::GatewayUnavailable(detail) => Some(detail.as_str()),
            ProcessEmailError::GatewayInvalidOutput { raw, reason } => {
                Some(raw.as_deref().unwrap_or(reason.as_str()))
            }
            _ => None,
        }
    }
}

impl From<ExtractionError> for ProcessEmailError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Unavailable(detail) => ProcessEmailError::GatewayUnavailable(detail),
            ExtractionError::InvalidOutput { reason, raw } => {
                ProcessEmailError::GatewayInvalidOutput { reason, raw }
            }
        }
    }
}

/// Failures of quote read operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote {0} not found")]
    NotFound(QuoteId),

    #[error("internal failure")]
    Internal(#[source] StoreError),
}

impl QuoteError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, QuoteError::NotFound(_))
    }
}

impl From<StoreError> for QuoteError {
    fn from(err: StoreError) -> Self {
        QuoteError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(ProcessEmailError::StorageConflict {
            constraint: "quotes_supplier_rfq_key".to_string()
        }
        .is_retryable());
        assert!(!ProcessEmailError::MissingIdentifier.is_retryable());
        assert!(!ProcessEmailError::InternalFailure.is_retryable());
        assert!(!ProcessEmailError::GatewayUnavailable("timeout".to_string()).is_retryable());
    }

    #[test]
    fn test_caller_errors() {
        assert!(ProcessEmailError::MissingIdentifier.is_caller_error());
        assert!(ProcessEmailError::RfqNotFound(RfqId::new()).is_caller_error());
        assert!(!ProcessEmailError::InternalFailure.is_caller_error());
    }

    #[test]
    fn test_invalid_output_keeps_raw_payload_out_of_display() {
        let err: ProcessEmailError = ExtractionError::InvalidOutput {
            reason: "expected number".to_string(),
            raw: Some("{\"price_per_pound\": \"cheap\"}".to_string()),
        }
        .into();
        assert_eq!(err.to_string(), "extraction service returned an invalid payload");
        assert_eq!(err.diagnostic(), Some("{\"price_per_pound\": \"cheap\"}"));
    }
}
