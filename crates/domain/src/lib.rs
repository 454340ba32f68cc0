//! Domain records and pure logic for the SMM storefront.
//!
//! Everything here is plain data plus side-effect-free functions: the
//! catalog [`Service`] record, the user [`Account`] with its balance
//! arithmetic, the persisted [`Order`], fund requests, and the charge
//! computation shared by the order placement flow.

pub mod account;
pub mod charge;
pub mod fund_request;
pub mod order;
pub mod service;

pub use account::Account;
pub use fund_request::{Currency, FundRequest, FundRequestStatus};
pub use order::{DisplayId, Order, OrderStatus};
pub use service::{QuantityViolation, Service};
