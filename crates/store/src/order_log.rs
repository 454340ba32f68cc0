//! Append-only order log.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::Order;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Append-only store of order records.
///
/// `insert` allocates a fresh key per call, so concurrent placements
/// never collide here. Nothing in order placement updates or deletes an
/// order once written; status transitions belong to reconciliation.
#[async_trait]
pub trait OrderLog: Send + Sync {
    /// Persists an order under a fresh key and returns the key.
    async fn insert(&self, order: Order) -> Result<OrderId>;

    /// Reads an order by key.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns a user's orders with their keys, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<(OrderId, Order)>>;
}

#[derive(Debug, Default)]
struct InMemoryOrderLogState {
    orders: HashMap<OrderId, Order>,
    fail_on_insert: bool,
}

/// In-memory order log for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderLog {
    state: Arc<RwLock<InMemoryOrderLogState>>,
}

impl InMemoryOrderLog {
    /// Creates a new empty order log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the log to fail on the next insert call.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl OrderLog for InMemoryOrderLog {
    async fn insert(&self, order: Order) -> Result<OrderId> {
        let mut state = self.state.write().await;

        if state.fail_on_insert {
            return Err(StoreError::Unavailable("insert rejected".to_string()));
        }

        let id = OrderId::new();
        state.orders.insert(id, order);
        Ok(id)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<(OrderId, Order)>> {
        let state = self.state.read().await;
        let mut orders: Vec<(OrderId, Order)> = state
            .orders
            .iter()
            .filter(|(_, o)| o.user_id == user_id)
            .map(|(id, o)| (*id, o.clone()))
            .collect();
        orders.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domain::{DisplayId, OrderStatus};
    use rust_decimal::Decimal;

    fn order_for(user_id: UserId, age_minutes: i64) -> Order {
        Order {
            display_id: DisplayId::generate(),
            user_id,
            user_email: "user@example.com".to_string(),
            service_id: 42,
            service_name: "TikTok Views".to_string(),
            link: "https://example.com/video/1".to_string(),
            quantity: 500,
            charge: Decimal::new(50_000, 4),
            created_at: Utc::now() - Duration::minutes(age_minutes),
            status: OrderStatus::Pending,
            provider_order_id: 555,
        }
    }

    #[tokio::test]
    async fn test_insert_allocates_fresh_keys() {
        let log = InMemoryOrderLog::new();
        let user = UserId::new();

        let id1 = log.insert(order_for(user, 0)).await.unwrap();
        let id2 = log.insert(order_for(user, 0)).await.unwrap();

        assert_ne!(id1, id2);
        assert_eq!(log.order_count().await, 2);
    }

    #[tokio::test]
    async fn test_get_returns_inserted_order() {
        let log = InMemoryOrderLog::new();
        let user = UserId::new();
        let order = order_for(user, 0);

        let id = log.insert(order.clone()).await.unwrap();
        let fetched = log.get(id).await.unwrap().unwrap();
        assert_eq!(fetched, order);
    }

    #[tokio::test]
    async fn test_orders_for_user_newest_first() {
        let log = InMemoryOrderLog::new();
        let user = UserId::new();
        let other = UserId::new();

        log.insert(order_for(user, 30)).await.unwrap();
        log.insert(order_for(user, 5)).await.unwrap();
        log.insert(order_for(other, 1)).await.unwrap();

        let orders = log.orders_for_user(user).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders[0].1.created_at > orders[1].1.created_at);
    }

    #[tokio::test]
    async fn test_fail_on_insert() {
        let log = InMemoryOrderLog::new();
        log.set_fail_on_insert(true).await;

        let result = log.insert(order_for(UserId::new(), 0)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(log.order_count().await, 0);
    }
}
