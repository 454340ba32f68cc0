//! Storage seams for the SMM storefront.
//!
//! Production deployments back these traits with a hosted document
//! database; the in-memory implementations here carry the same contracts
//! and power the test suites. The one non-trivial contract is
//! [`AccountStore::transact`]: an atomic conditional read-modify-write on
//! a single account record, which is what keeps concurrent balance
//! updates from losing writes.

pub mod account;
pub mod catalog;
pub mod error;
pub mod fund_requests;
pub mod order_log;

pub use account::{AccountStore, InMemoryAccountStore, TransactionOutcome, Transition};
pub use catalog::{InMemoryServiceCatalog, ServiceCatalog};
pub use error::{Result, StoreError};
pub use fund_requests::{FundRequestStore, InMemoryFundRequestStore};
pub use order_log::{InMemoryOrderLog, OrderLog};
