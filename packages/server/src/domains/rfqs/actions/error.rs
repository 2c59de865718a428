use thiserror::Error;

use crate::common::RfqId;
use crate::kernel::StoreError;

#[derive(Debug, Error)]
pub enum RfqError {
    #[error("invalid RFQ: {0}")]
    Invalid(String),

    #[error("RFQ {0} not found")]
    NotFound(RfqId),

    /// A concurrent request created one of the same certifications first.
    #[error("conflicting concurrent write ({constraint}), retry the request")]
    Conflict { constraint: String },

    #[error("internal failure")]
    Internal(#[source] StoreError),
}

impl RfqError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RfqError::Conflict { .. })
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, RfqError::Invalid(_) | RfqError::NotFound(_))
    }
}

impl From<StoreError> for RfqError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { constraint } => RfqError::Conflict { constraint },
            other => RfqError::Internal(other),
        }
    }
}
