//! Order placement coordinator.

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{DisplayId, Order, OrderStatus, Service, charge};
use rust_decimal::Decimal;
use store::{AccountStore, OrderLog, Transition};

use crate::error::{CompensationOutcome, PlaceOrderError, PlacementFailure};
use crate::services::{AddOrder, ProviderGateway};
use crate::state::PlacementState;

/// A user's intent to order a service.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    /// The catalog service being ordered.
    pub service: Service,
    /// Target link to deliver to.
    pub link: String,
    /// Quantity requested.
    pub quantity: u32,
}

/// Result of a successful placement, surfaced to the caller for
/// confirmation.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// Storage key of the persisted order.
    pub order_id: OrderId,
    /// Human-facing order reference.
    pub display_id: DisplayId,
    /// The id the provider assigned to the submission.
    pub provider_order_id: u64,
    /// Amount deducted from the balance.
    pub charge: Decimal,
}

/// Coordinates the order placement saga.
///
/// Drives reserve-funds → provider submission → order persistence, with
/// a compensating refund when a step fails after the debit committed.
/// Nothing is retried: every invocation reaches a terminal success or a
/// terminal, classified failure.
pub struct OrderPlacement<A, P, L>
where
    A: AccountStore,
    P: ProviderGateway,
    L: OrderLog,
{
    accounts: A,
    provider: P,
    orders: L,
}

impl<A, P, L> OrderPlacement<A, P, L>
where
    A: AccountStore,
    P: ProviderGateway,
    L: OrderLog,
{
    /// Creates a new placement coordinator.
    pub fn new(accounts: A, provider: P, orders: L) -> Self {
        Self {
            accounts,
            provider,
            orders,
        }
    }

    /// Places an order for the given user.
    ///
    /// Preconditions (link, quantity bounds, identity) are checked
    /// before any mutation; failing them has no side effects. Once the
    /// charge is deducted, any later failure credits it back before the
    /// error is surfaced, and a refund that itself fails is reported as
    /// an annotation on the original error rather than replacing it.
    #[tracing::instrument(
        skip(self, intent),
        fields(service = intent.service.provider_service_id, quantity = intent.quantity)
    )]
    pub async fn place(
        &self,
        identity: Option<UserId>,
        intent: OrderIntent,
    ) -> Result<PlacedOrder, PlacementFailure> {
        metrics::counter!("order_placements_total").increment(1);
        let start = std::time::Instant::now();
        let mut state = PlacementState::Started;

        // Preconditions: fail fast, nothing has been charged yet.
        if intent.link.trim().is_empty() {
            return Err(self.reject(state, PlaceOrderError::MissingLink));
        }
        if let Err(violation) = intent.service.validate_quantity(intent.quantity) {
            return Err(self.reject(state, violation.into()));
        }
        let Some(user_id) = identity else {
            return Err(self.reject(state, PlaceOrderError::Auth));
        };

        let charge = charge::compute(intent.service.rate, intent.quantity);

        // Step 1: reserve funds with an atomic conditional debit.
        let outcome = match self
            .accounts
            .transact(user_id, |current| match current {
                Some(account) => match account.debited(charge) {
                    Some(next) => Transition::Update(next),
                    None => Transition::Abort,
                },
                None => Transition::Abort,
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.reject(state, PlaceOrderError::Store(e))),
        };

        if !outcome.committed {
            return Err(self.reject(state, PlaceOrderError::InsufficientFunds));
        }
        state = PlacementState::FundsReserved;
        let user_email = outcome.account.map(|a| a.email).unwrap_or_default();
        tracing::debug!(%user_id, %charge, "funds reserved");

        // Step 2: submit to the provider.
        let submission = AddOrder {
            service: intent.service.provider_service_id,
            link: intent.link.clone(),
            quantity: intent.quantity,
        };
        let provider_order_id = match self.provider.add_order(submission).await {
            Ok(id) => id,
            Err(e) => {
                return Err(self.fail(&mut state, user_id, charge, e.into()).await);
            }
        };

        // Step 3: persist the order record.
        let display_id = DisplayId::generate();
        let order = Order {
            display_id,
            user_id,
            user_email,
            service_id: intent.service.provider_service_id,
            service_name: intent.service.name.clone(),
            link: intent.link,
            quantity: intent.quantity,
            charge,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
            provider_order_id,
        };
        let order_id = match self.orders.insert(order).await {
            Ok(id) => id,
            Err(e) => {
                // The provider-side order cannot be cancelled from here;
                // the refund still runs so the user is not left charged.
                return Err(
                    self.fail(&mut state, user_id, charge, PlaceOrderError::OrderPersist(e))
                        .await,
                );
            }
        };
        state = PlacementState::OrderPersisted;

        metrics::histogram!("order_placement_duration_seconds").record(start.elapsed().as_secs_f64());
        metrics::counter!("order_placements_completed").increment(1);
        tracing::info!(%display_id, provider_order_id, %state, "order placed");

        Ok(PlacedOrder {
            order_id,
            display_id,
            provider_order_id,
            charge,
        })
    }

    /// A failure from before any funds were reserved.
    fn reject(&self, state: PlacementState, error: PlaceOrderError) -> PlacementFailure {
        metrics::counter!("order_placements_failed").increment(1);
        tracing::warn!(%state, error = %error, "order rejected before funds were reserved");
        PlacementFailure::before_reservation(error)
    }

    /// A failure after the debit committed: credit the charge back, then
    /// surface the original error with the refund outcome attached.
    async fn fail(
        &self,
        state: &mut PlacementState,
        user_id: UserId,
        charge: Decimal,
        error: PlaceOrderError,
    ) -> PlacementFailure {
        tracing::warn!(from = %*state, error = %error, %charge, "placement failed, refunding charge");
        *state = PlacementState::Compensating;

        // Credit against the current balance rather than restoring the
        // value observed at reservation time: other writers (a referral
        // bonus, a concurrent top-up) may have touched the record since.
        let refund = self
            .accounts
            .transact(user_id, |current| match current {
                Some(account) => Transition::Update(account.credited(charge)),
                None => Transition::Abort,
            })
            .await;

        let compensation = match refund {
            Ok(outcome) if outcome.committed => CompensationOutcome::Refunded,
            Ok(_) => {
                metrics::counter!("refund_failures_total").increment(1);
                tracing::error!(%user_id, %charge, "refund aborted: account record missing");
                CompensationOutcome::Failed("account record missing".to_string())
            }
            Err(e) => {
                metrics::counter!("refund_failures_total").increment(1);
                tracing::error!(%user_id, %charge, refund_error = %e, "refund transaction failed");
                CompensationOutcome::Failed(e.to_string())
            }
        };

        *state = PlacementState::Failed;
        metrics::counter!("order_placements_failed").increment(1);
        PlacementFailure { error, compensation }
    }
}
