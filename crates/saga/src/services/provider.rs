//! Provider gateway trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

/// An order submission to the provider's add-order endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOrder {
    /// The provider-side service id.
    pub service: u32,
    /// Target link.
    pub link: String,
    /// Quantity ordered.
    pub quantity: u32,
}

/// Errors from the provider gateway.
///
/// Transport-level failures (no response at all) are kept distinct from
/// responses carrying an explicit error payload, and from responses that
/// carry neither an error nor an order id.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// The provider answered with an error payload.
    #[error("{0}")]
    Rejected(String),

    /// The response carried neither an order id nor an error.
    #[error("response carried neither an order id nor an error")]
    Protocol,
}

/// Trait for submitting orders to the upstream SMM provider.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Submits an order and returns the provider-assigned order id.
    async fn add_order(&self, request: AddOrder) -> Result<u64, ProviderError>;
}

/// Scripted response behavior for the in-memory gateway.
#[derive(Debug, Clone, Default)]
pub enum ProviderBehavior {
    /// Accept the order and return the next order id.
    #[default]
    Accept,
    /// Answer with an error payload.
    Reject(String),
    /// Fail at the transport level.
    TransportFailure,
    /// Time out.
    Timeout,
    /// Answer with neither an order id nor an error.
    EmptyResponse,
}

#[derive(Debug)]
struct InMemoryProviderState {
    submissions: Vec<AddOrder>,
    next_order_id: u64,
    behavior: ProviderBehavior,
}

impl Default for InMemoryProviderState {
    fn default() -> Self {
        Self {
            submissions: Vec::new(),
            next_order_id: 1,
            behavior: ProviderBehavior::Accept,
        }
    }
}

/// In-memory provider gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderGateway {
    state: Arc<RwLock<InMemoryProviderState>>,
}

impl InMemoryProviderGateway {
    /// Creates a gateway that accepts every order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response to subsequent add-order calls.
    pub fn set_behavior(&self, behavior: ProviderBehavior) {
        self.state.write().unwrap().behavior = behavior;
    }

    /// Sets the order id returned on the next accepted submission.
    pub fn set_next_order_id(&self, id: u64) {
        self.state.write().unwrap().next_order_id = id;
    }

    /// Returns the number of accepted submissions.
    pub fn submission_count(&self) -> usize {
        self.state.read().unwrap().submissions.len()
    }

    /// Returns the last accepted submission, if any.
    pub fn last_submission(&self) -> Option<AddOrder> {
        self.state.read().unwrap().submissions.last().cloned()
    }
}

#[async_trait]
impl ProviderGateway for InMemoryProviderGateway {
    async fn add_order(&self, request: AddOrder) -> Result<u64, ProviderError> {
        let mut state = self.state.write().unwrap();

        match state.behavior.clone() {
            ProviderBehavior::Accept => {
                let id = state.next_order_id;
                state.next_order_id += 1;
                state.submissions.push(request);
                Ok(id)
            }
            ProviderBehavior::Reject(message) => Err(ProviderError::Rejected(message)),
            ProviderBehavior::TransportFailure => {
                Err(ProviderError::Transport("connection refused".to_string()))
            }
            ProviderBehavior::Timeout => Err(ProviderError::Timeout),
            ProviderBehavior::EmptyResponse => Err(ProviderError::Protocol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AddOrder {
        AddOrder {
            service: 42,
            link: "https://example.com/video/1".to_string(),
            quantity: 500,
        }
    }

    #[tokio::test]
    async fn test_accept_returns_sequential_ids() {
        let gateway = InMemoryProviderGateway::new();
        gateway.set_next_order_id(555);

        let first = gateway.add_order(request()).await.unwrap();
        let second = gateway.add_order(request()).await.unwrap();

        assert_eq!(first, 555);
        assert_eq!(second, 556);
        assert_eq!(gateway.submission_count(), 2);
        assert_eq!(gateway.last_submission().unwrap(), request());
    }

    #[tokio::test]
    async fn test_reject_records_no_submission() {
        let gateway = InMemoryProviderGateway::new();
        gateway.set_behavior(ProviderBehavior::Reject("not enough funds".to_string()));

        let result = gateway.add_order(request()).await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
        assert_eq!(gateway.submission_count(), 0);
    }

    #[tokio::test]
    async fn test_scripted_failure_modes() {
        let gateway = InMemoryProviderGateway::new();

        gateway.set_behavior(ProviderBehavior::TransportFailure);
        assert!(matches!(
            gateway.add_order(request()).await,
            Err(ProviderError::Transport(_))
        ));

        gateway.set_behavior(ProviderBehavior::Timeout);
        assert!(matches!(
            gateway.add_order(request()).await,
            Err(ProviderError::Timeout)
        ));

        gateway.set_behavior(ProviderBehavior::EmptyResponse);
        assert!(matches!(
            gateway.add_order(request()).await,
            Err(ProviderError::Protocol)
        ));
    }
}
