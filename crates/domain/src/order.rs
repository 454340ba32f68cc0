//! Persisted order records and the human-facing display identifier.

use chrono::{DateTime, Utc};
use common::UserId;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// Orders are created `Pending`; later transitions are driven by a
/// separate reconciliation process against the provider, not by order
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
    Partial,
}

impl OrderStatus {
    /// Returns the status name as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Partial => "Partial",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Six-digit order reference shown to users, distinct from the storage key.
///
/// Drawn uniformly from `[100000, 999999]`. Collisions with prior ids are
/// not checked; the storage key remains the unique handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(u32);

impl DisplayId {
    /// Generates a random display identifier.
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(100_000..=999_999))
    }

    /// Returns the numeric value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The persisted result of a successful order placement.
///
/// Written exactly once per placement and never mutated by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Human-facing order reference.
    pub display_id: DisplayId,
    /// Owning user.
    pub user_id: UserId,
    /// Owner's email at placement time.
    pub user_email: String,
    /// The provider-side service id that was ordered.
    pub service_id: u32,
    /// Service name at placement time.
    pub service_name: String,
    /// Target link submitted to the provider.
    pub link: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Amount deducted from the account balance.
    pub charge: Decimal,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Lifecycle status, `Pending` at creation.
    pub status: OrderStatus,
    /// The order id the provider returned on acceptance.
    pub provider_order_id: u64,
}
