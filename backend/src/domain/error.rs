//! Error taxonomy for the data-access layer.
//!
//! Repositories raise [`DataAccessError`]; the CRUD service converts every
//! variant into an [`OperationResult`](super::OperationResult) so nothing
//! escapes past the service boundary as a raw error.

use super::ResponseCode;
use super::ports::StoreError;

/// Failures raised while reading or writing entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataAccessError {
    /// Input was empty or malformed.
    #[error("invalid input: {message}")]
    Validation { message: String },
    /// No row exists for the requested identity.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    /// The store rejected a write, or a write expected to touch rows touched none.
    #[error("persistence failed: {message}")]
    Persistence { message: String },
    /// Commit or rollback requested without a matching open transaction.
    #[error("transaction state error: {message}")]
    TransactionState { message: String },
}

impl DataAccessError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn transaction_state(message: impl Into<String>) -> Self {
        Self::TransactionState {
            message: message.into(),
        }
    }

    /// Response code an inbound adapter should report for this failure.
    #[must_use]
    pub const fn response_code(&self) -> ResponseCode {
        match self {
            Self::Validation { .. } => ResponseCode::BadRequest,
            Self::NotFound { .. } => ResponseCode::NotFound,
            Self::Persistence { .. } | Self::TransactionState { .. } => {
                ResponseCode::InternalServerError
            }
        }
    }
}

impl From<StoreError> for DataAccessError {
    fn from(error: StoreError) -> Self {
        Self::persistence(error.to_string())
    }
}
