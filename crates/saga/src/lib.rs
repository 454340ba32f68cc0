//! Order placement saga for the SMM storefront.
//!
//! Placing an order chains three individually-committing steps:
//! 1. Reserve funds (atomic conditional debit on the account record)
//! 2. Submit the order to the upstream provider
//! 3. Persist the order record
//!
//! If step 2 or 3 fails, the reserved charge is credited back in a
//! compensating transaction. There is no durable intermediate state and
//! no retry: each invocation runs to a terminal success or a terminal,
//! fully classified failure.

pub mod error;
pub mod placement;
pub mod services;
pub mod state;

pub use error::{CompensationOutcome, PlaceOrderError, PlacementFailure};
pub use placement::{OrderIntent, OrderPlacement, PlacedOrder};
pub use services::{
    AddOrder, HttpProviderGateway, InMemoryProviderGateway, ProviderBehavior, ProviderError,
    ProviderGateway,
};
pub use state::PlacementState;
