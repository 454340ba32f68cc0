use common::FundRequestId;
use thiserror::Error;

/// Errors that can occur when interacting with the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No fund request exists under the given key.
    #[error("Fund request not found: {0}")]
    FundRequestNotFound(FundRequestId),

    /// The fund request has already been completed or cancelled.
    #[error("Fund request {0} is already resolved")]
    FundRequestResolved(FundRequestId),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
