//! Placement error taxonomy.

use domain::QuantityViolation;
use store::StoreError;
use thiserror::Error;

use crate::services::ProviderError;

/// Terminal classification of a failed order placement.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// A target link is required. No side effects.
    #[error("A link is required to place an order")]
    MissingLink,

    /// Quantity outside the service's accepted range. No side effects.
    #[error("Invalid quantity: {0}")]
    Quantity(#[from] QuantityViolation),

    /// No authenticated user identity was supplied. No side effects.
    #[error("You must be logged in to place an order")]
    Auth,

    /// The balance could not cover the charge, or the account record is
    /// absent. No side effects.
    #[error("Balance is too low to place this order")]
    InsufficientFunds,

    /// The account store failed while reserving funds. No funds are
    /// considered reserved.
    #[error("Account store error: {0}")]
    Store(StoreError),

    /// The provider call never produced a response.
    #[error("Could not reach the provider: {0}")]
    ProviderTransport(String),

    /// The provider call did not complete within the deadline.
    #[error("The provider did not respond in time")]
    ProviderTimeout,

    /// The provider answered with an explicit error payload.
    #[error("The provider rejected the order: {0}")]
    ProviderResponse(String),

    /// The provider response carried neither an order id nor an error.
    #[error("The provider returned an unusable response")]
    ProviderProtocol,

    /// The order record could not be written after the provider accepted
    /// the submission.
    #[error("Failed to record the order: {0}")]
    OrderPersist(StoreError),
}

impl From<ProviderError> for PlaceOrderError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(msg) => PlaceOrderError::ProviderTransport(msg),
            ProviderError::Timeout => PlaceOrderError::ProviderTimeout,
            ProviderError::Rejected(msg) => PlaceOrderError::ProviderResponse(msg),
            ProviderError::Protocol => PlaceOrderError::ProviderProtocol,
        }
    }
}

/// What happened to the reserved funds after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// No funds were reserved; there was nothing to revert.
    NotNeeded,

    /// The reserved charge was credited back to the account.
    Refunded,

    /// The refund transaction itself failed. The account is
    /// under-credited and needs manual reconciliation.
    Failed(String),
}

impl CompensationOutcome {
    /// Returns true if the account was left under-credited.
    pub fn refund_failed(&self) -> bool {
        matches!(self, CompensationOutcome::Failed(_))
    }
}

/// A failed placement: the terminal error plus the refund outcome.
///
/// The compensation outcome annotates the failure rather than replacing
/// it; the caller always sees the original error classification.
#[derive(Debug)]
pub struct PlacementFailure {
    /// Why the placement failed.
    pub error: PlaceOrderError,
    /// What happened to the reserved funds.
    pub compensation: CompensationOutcome,
}

impl PlacementFailure {
    /// A failure from before any funds were reserved.
    pub fn before_reservation(error: PlaceOrderError) -> Self {
        Self {
            error,
            compensation: CompensationOutcome::NotNeeded,
        }
    }
}

impl std::fmt::Display for PlacementFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        match &self.compensation {
            CompensationOutcome::NotNeeded => Ok(()),
            CompensationOutcome::Refunded => write!(f, " (charge refunded)"),
            CompensationOutcome::Failed(reason) => {
                write!(f, " (refund failed, manual reconciliation required: {reason})")
            }
        }
    }
}

impl std::error::Error for PlacementFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_classification() {
        assert!(matches!(
            PlaceOrderError::from(ProviderError::Transport("connection refused".into())),
            PlaceOrderError::ProviderTransport(_)
        ));
        assert!(matches!(
            PlaceOrderError::from(ProviderError::Timeout),
            PlaceOrderError::ProviderTimeout
        ));
        assert!(matches!(
            PlaceOrderError::from(ProviderError::Rejected("not enough funds".into())),
            PlaceOrderError::ProviderResponse(_)
        ));
        assert!(matches!(
            PlaceOrderError::from(ProviderError::Protocol),
            PlaceOrderError::ProviderProtocol
        ));
    }

    #[test]
    fn test_failure_display_keeps_original_error() {
        let failure = PlacementFailure {
            error: PlaceOrderError::ProviderResponse("link not accepted".into()),
            compensation: CompensationOutcome::Failed("store unavailable".into()),
        };
        let rendered = failure.to_string();
        assert!(rendered.contains("link not accepted"));
        assert!(rendered.contains("manual reconciliation"));
    }

    #[test]
    fn test_before_reservation_needs_no_compensation() {
        let failure = PlacementFailure::before_reservation(PlaceOrderError::Auth);
        assert_eq!(failure.compensation, CompensationOutcome::NotNeeded);
        assert!(!failure.compensation.refund_failed());
    }
}
