//! Account storage with an atomic conditional transaction primitive.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::Account;
use tokio::sync::RwLock;

use crate::error::Result;

/// Decision returned by a transaction closure.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Commit the record with this new value.
    Update(Account),
    /// Abort without modifying the record.
    Abort,
}

/// Result of a conditional transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Whether the update committed.
    pub committed: bool,
    /// The record value after the transaction (the committed value on
    /// success, the unmodified current value on abort).
    pub account: Option<Account>,
}

/// Store of user account records.
///
/// `transact` is the only way balances are mutated: the closure sees the
/// current record value and decides to update or abort, and the store
/// applies the update atomically with respect to other transactions on
/// the same record. Emulating this with separate read and write calls
/// would reintroduce the lost-update race this contract exists to prevent.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Runs an atomic conditional read-modify-write on one account record.
    ///
    /// The closure receives the current value (`None` if the record does
    /// not exist) and returns a [`Transition`]. It may be invoked more
    /// than once if the backend retries on contention, so it must be free
    /// of side effects.
    async fn transact<F>(&self, user_id: UserId, update: F) -> Result<TransactionOutcome>
    where
        F: FnMut(Option<Account>) -> Transition + Send;

    /// Reads an account record.
    async fn get(&self, user_id: UserId) -> Result<Option<Account>>;

    /// Writes an account record unconditionally. Used for provisioning
    /// new accounts, never for balance updates.
    async fn put(&self, user_id: UserId, account: Account) -> Result<()>;
}

/// In-memory account store.
///
/// A single lock over the whole map makes every transaction trivially
/// atomic, which matches the contract the hosted backend provides
/// per-record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<UserId, Account>>>,
}

impl InMemoryAccountStore {
    /// Creates a new empty account store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts.
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn transact<F>(&self, user_id: UserId, mut update: F) -> Result<TransactionOutcome>
    where
        F: FnMut(Option<Account>) -> Transition + Send,
    {
        let mut accounts = self.accounts.write().await;
        let current = accounts.get(&user_id).cloned();

        match update(current.clone()) {
            Transition::Update(next) => {
                accounts.insert(user_id, next.clone());
                Ok(TransactionOutcome {
                    committed: true,
                    account: Some(next),
                })
            }
            Transition::Abort => Ok(TransactionOutcome {
                committed: false,
                account: current,
            }),
        }
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&user_id).cloned())
    }

    async fn put(&self, user_id: UserId, account: Account) -> Result<()> {
        self.accounts.write().await.insert(user_id, account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_transact_commits_update() {
        let store = InMemoryAccountStore::new();
        let user = UserId::new();
        store
            .put(user, Account::new("user@example.com", Decimal::from(100)))
            .await
            .unwrap();

        let outcome = store
            .transact(user, |current| match current {
                Some(account) => match account.debited(Decimal::from(10)) {
                    Some(next) => Transition::Update(next),
                    None => Transition::Abort,
                },
                None => Transition::Abort,
            })
            .await
            .unwrap();

        assert!(outcome.committed);
        assert_eq!(outcome.account.unwrap().balance, Decimal::from(90));
        assert_eq!(
            store.get(user).await.unwrap().unwrap().balance,
            Decimal::from(90)
        );
    }

    #[tokio::test]
    async fn test_transact_abort_leaves_record_untouched() {
        let store = InMemoryAccountStore::new();
        let user = UserId::new();
        store
            .put(user, Account::new("user@example.com", Decimal::from(5)))
            .await
            .unwrap();

        let outcome = store
            .transact(user, |current| match current {
                Some(account) => match account.debited(Decimal::from(10)) {
                    Some(next) => Transition::Update(next),
                    None => Transition::Abort,
                },
                None => Transition::Abort,
            })
            .await
            .unwrap();

        assert!(!outcome.committed);
        assert_eq!(
            store.get(user).await.unwrap().unwrap().balance,
            Decimal::from(5)
        );
    }

    #[tokio::test]
    async fn test_transact_on_missing_record() {
        let store = InMemoryAccountStore::new();
        let outcome = store
            .transact(UserId::new(), |current| match current {
                Some(_) => panic!("record should not exist"),
                None => Transition::Abort,
            })
            .await
            .unwrap();

        assert!(!outcome.committed);
        assert!(outcome.account.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_debits_do_not_lose_updates() {
        let store = InMemoryAccountStore::new();
        let user = UserId::new();
        store
            .put(user, Account::new("user@example.com", Decimal::from(100)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .transact(user, |current| match current {
                        Some(account) => match account.debited(Decimal::from(10)) {
                            Some(next) => Transition::Update(next),
                            None => Transition::Abort,
                        },
                        None => Transition::Abort,
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap().committed {
                committed += 1;
            }
        }

        assert_eq!(committed, 10);
        assert_eq!(
            store.get(user).await.unwrap().unwrap().balance,
            Decimal::ZERO
        );
    }
}
