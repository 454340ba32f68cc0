//! Fund request storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{FundRequestId, UserId};
use domain::{FundRequest, FundRequestStatus};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Store of balance top-up requests.
#[async_trait]
pub trait FundRequestStore: Send + Sync {
    /// Persists a new request under a fresh key and returns the key.
    async fn insert(&self, request: FundRequest) -> Result<FundRequestId>;

    /// Reads a request by key.
    async fn get(&self, id: FundRequestId) -> Result<Option<FundRequest>>;

    /// Moves a pending request to a resolved status.
    ///
    /// Fails with [`StoreError::FundRequestResolved`] if the request has
    /// already been completed or cancelled, so a request can only be
    /// resolved once.
    async fn resolve(&self, id: FundRequestId, status: FundRequestStatus) -> Result<FundRequest>;

    /// Returns a user's requests with their keys, newest first.
    async fn requests_for_user(&self, user_id: UserId)
    -> Result<Vec<(FundRequestId, FundRequest)>>;
}

/// In-memory fund request store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFundRequestStore {
    requests: Arc<RwLock<HashMap<FundRequestId, FundRequest>>>,
}

impl InMemoryFundRequestStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FundRequestStore for InMemoryFundRequestStore {
    async fn insert(&self, request: FundRequest) -> Result<FundRequestId> {
        let id = FundRequestId::new();
        self.requests.write().await.insert(id, request);
        Ok(id)
    }

    async fn get(&self, id: FundRequestId) -> Result<Option<FundRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn resolve(&self, id: FundRequestId, status: FundRequestStatus) -> Result<FundRequest> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or(StoreError::FundRequestNotFound(id))?;

        if request.status.is_resolved() {
            return Err(StoreError::FundRequestResolved(id));
        }

        request.status = status;
        Ok(request.clone())
    }

    async fn requests_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<(FundRequestId, FundRequest)>> {
        let requests = self.requests.read().await;
        let mut matching: Vec<(FundRequestId, FundRequest)> = requests
            .iter()
            .filter(|(_, r)| r.user_id == user_id)
            .map(|(id, r)| (*id, r.clone()))
            .collect();
        matching.sort_by(|a, b| b.1.requested_at.cmp(&a.1.requested_at));
        Ok(matching)
    }
}
