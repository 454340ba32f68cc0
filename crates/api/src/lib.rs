//! HTTP API server for the SMM storefront.
//!
//! Exposes order placement, order history, the service catalog, account
//! registration, and fund requests, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryProviderGateway, OrderPlacement, ProviderGateway};
use store::{
    AccountStore, FundRequestStore, InMemoryAccountStore, InMemoryFundRequestStore,
    InMemoryOrderLog, InMemoryServiceCatalog, OrderLog, ServiceCatalog,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<A, P, L, C, F>(
    state: Arc<AppState<A, P, L, C, F>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<A, P, L, C, F>))
        .route("/orders", get(routes::orders::list::<A, P, L, C, F>))
        .route("/orders/{id}", get(routes::orders::get::<A, P, L, C, F>))
        .route("/services", get(routes::services::list::<A, P, L, C, F>))
        .route(
            "/categories",
            get(routes::services::categories::<A, P, L, C, F>),
        )
        .route(
            "/accounts",
            post(routes::accounts::register::<A, P, L, C, F>),
        )
        .route("/accounts/{id}", get(routes::accounts::get::<A, P, L, C, F>))
        .route(
            "/fund-requests",
            post(routes::fund_requests::create::<A, P, L, C, F>),
        )
        .route(
            "/fund-requests",
            get(routes::fund_requests::list::<A, P, L, C, F>),
        )
        .route(
            "/fund-requests/{id}/complete",
            post(routes::fund_requests::complete::<A, P, L, C, F>),
        )
        .route(
            "/fund-requests/{id}/cancel",
            post(routes::fund_requests::cancel::<A, P, L, C, F>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state from the given storage and gateway
/// implementations.
pub fn create_state<A, P, L, C, F>(
    accounts: A,
    provider: P,
    orders: L,
    catalog: C,
    fund_requests: F,
) -> Arc<AppState<A, P, L, C, F>>
where
    A: AccountStore + Clone,
    P: ProviderGateway,
    L: OrderLog + Clone,
    C: ServiceCatalog,
    F: FundRequestStore,
{
    let placement = OrderPlacement::new(accounts.clone(), provider, orders.clone());
    Arc::new(AppState {
        placement,
        accounts,
        orders,
        catalog,
        fund_requests,
    })
}

/// Creates application state backed entirely by in-memory stores and an
/// in-memory provider gateway.
pub fn create_in_memory_state() -> Arc<
    AppState<
        InMemoryAccountStore,
        InMemoryProviderGateway,
        InMemoryOrderLog,
        InMemoryServiceCatalog,
        InMemoryFundRequestStore,
    >,
> {
    create_state(
        InMemoryAccountStore::new(),
        InMemoryProviderGateway::new(),
        InMemoryOrderLog::new(),
        InMemoryServiceCatalog::new(),
        InMemoryFundRequestStore::new(),
    )
}
