//! Balance top-up requests.

use chrono::{DateTime, Utc};
use common::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency a fund request was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "BDT")]
    Bdt,
    #[serde(rename = "USD")]
    Usd,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Bdt => write!(f, "BDT"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

/// Status of a fund request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FundRequestStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl FundRequestStatus {
    /// Returns true once the request has been completed or cancelled.
    pub fn is_resolved(&self) -> bool {
        matches!(self, FundRequestStatus::Completed | FundRequestStatus::Cancelled)
    }
}

impl std::fmt::Display for FundRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FundRequestStatus::Pending => "Pending",
            FundRequestStatus::Completed => "Completed",
            FundRequestStatus::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

/// A user's request to add funds to their balance.
///
/// Users pay through an external method and file the transaction
/// reference here; an operator completes the request, which credits the
/// balance through the account store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRequest {
    /// Requesting user.
    pub user_id: UserId,
    /// Requester's email at filing time.
    pub user_email: String,
    /// When the request was filed.
    pub requested_at: DateTime<Utc>,
    /// Amount to credit on completion.
    pub amount: Decimal,
    /// Currency of the payment.
    pub currency: Currency,
    /// Payment method name (e.g. "bKash").
    pub method: String,
    /// External transaction reference supplied by the user.
    pub transaction_ref: String,
    /// Current status.
    pub status: FundRequestStatus,
}

impl FundRequest {
    /// Creates a new pending fund request.
    pub fn new(
        user_id: UserId,
        user_email: impl Into<String>,
        amount: Decimal,
        currency: Currency,
        method: impl Into<String>,
        transaction_ref: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            user_email: user_email.into(),
            requested_at: Utc::now(),
            amount,
            currency,
            method: method.into(),
            transaction_ref: transaction_ref.into(),
            status: FundRequestStatus::Pending,
        }
    }
}
