//! Placement state machine.

use serde::{Deserialize, Serialize};

/// The state of a single order placement as it moves through the saga.
///
/// State transitions:
/// ```text
/// Started ──► FundsReserved ──► OrderPersisted
///    │              └──► Compensating ──► Failed
///    └──► Failed
/// ```
///
/// Whether compensation runs on failure is decided solely by this state:
/// once funds are reserved, every failure path must pass through
/// `Compensating` before reaching `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlacementState {
    /// Preconditions are being checked; nothing has been charged.
    #[default]
    Started,

    /// The charge was deducted from the account balance.
    FundsReserved,

    /// A later step failed and the charge is being credited back.
    Compensating,

    /// The order record was written (terminal success).
    OrderPersisted,

    /// The placement failed (terminal).
    Failed,
}

impl PlacementState {
    /// Returns true if a failure from this state requires a refund.
    pub fn needs_compensation(&self) -> bool {
        matches!(self, PlacementState::FundsReserved)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlacementState::OrderPersisted | PlacementState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementState::Started => "Started",
            PlacementState::FundsReserved => "FundsReserved",
            PlacementState::Compensating => "Compensating",
            PlacementState::OrderPersisted => "OrderPersisted",
            PlacementState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PlacementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_started() {
        assert_eq!(PlacementState::default(), PlacementState::Started);
    }

    #[test]
    fn test_only_funds_reserved_needs_compensation() {
        assert!(!PlacementState::Started.needs_compensation());
        assert!(PlacementState::FundsReserved.needs_compensation());
        assert!(!PlacementState::Compensating.needs_compensation());
        assert!(!PlacementState::OrderPersisted.needs_compensation());
        assert!(!PlacementState::Failed.needs_compensation());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!PlacementState::Started.is_terminal());
        assert!(!PlacementState::FundsReserved.is_terminal());
        assert!(!PlacementState::Compensating.is_terminal());
        assert!(PlacementState::OrderPersisted.is_terminal());
        assert!(PlacementState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(PlacementState::Started.to_string(), "Started");
        assert_eq!(PlacementState::FundsReserved.to_string(), "FundsReserved");
        assert_eq!(PlacementState::Compensating.to_string(), "Compensating");
        assert_eq!(PlacementState::OrderPersisted.to_string(), "OrderPersisted");
        assert_eq!(PlacementState::Failed.to_string(), "Failed");
    }
}
