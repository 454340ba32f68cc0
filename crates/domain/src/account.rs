//! User account records and balance arithmetic.

use common::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's account record.
///
/// The balance is only ever mutated through the account store's
/// conditional transaction, so the helpers here return updated copies
/// for the transaction closure to commit rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Contact email, denormalized onto orders and fund requests.
    pub email: String,
    /// Current balance. Never negative as an outcome of order placement.
    pub balance: Decimal,
    /// The user who referred this account, if any.
    pub referred_by: Option<UserId>,
}

impl Account {
    /// Creates an account with the given starting balance.
    pub fn new(email: impl Into<String>, balance: Decimal) -> Self {
        Self {
            email: email.into(),
            balance,
            referred_by: None,
        }
    }

    /// Sets the referrer on a new account.
    pub fn referred_by(mut self, referrer: UserId) -> Self {
        self.referred_by = Some(referrer);
        self
    }

    /// Returns a copy with `amount` deducted, or `None` if the balance
    /// cannot cover it.
    pub fn debited(&self, amount: Decimal) -> Option<Account> {
        if self.balance >= amount {
            Some(Account {
                balance: self.balance - amount,
                ..self.clone()
            })
        } else {
            None
        }
    }

    /// Returns a copy with `amount` added to the balance.
    pub fn credited(&self, amount: Decimal) -> Account {
        Account {
            balance: self.balance + amount,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_debit_with_sufficient_balance() {
        let account = Account::new("user@example.com", Decimal::from(100));
        let debited = account.debited(Decimal::from(10)).unwrap();
        assert_eq!(debited.balance, Decimal::from(90));
        assert_eq!(debited.email, "user@example.com");
    }

    #[test]
    fn test_debit_exact_balance() {
        let account = Account::new("user@example.com", Decimal::from(10));
        let debited = account.debited(Decimal::from(10)).unwrap();
        assert_eq!(debited.balance, Decimal::ZERO);
    }

    #[test]
    fn test_debit_insufficient_balance() {
        let account = Account::new("user@example.com", Decimal::from(5));
        assert!(account.debited(Decimal::from(10)).is_none());
        // the original is untouched
        assert_eq!(account.balance, Decimal::from(5));
    }

    #[test]
    fn test_credit() {
        let account = Account::new("user@example.com", Decimal::from_str("90.5").unwrap());
        let credited = account.credited(Decimal::from_str("9.5").unwrap());
        assert_eq!(credited.balance, Decimal::from(100));
    }

    #[test]
    fn test_referred_by() {
        let referrer = UserId::new();
        let account = Account::new("new@example.com", Decimal::from(2)).referred_by(referrer);
        assert_eq!(account.referred_by, Some(referrer));
    }
}
