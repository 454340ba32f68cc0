//! Order placement and history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::Order;
use rust_decimal::Decimal;
use saga::{OrderIntent, OrderPlacement, ProviderGateway};
use serde::{Deserialize, Serialize};
use store::{AccountStore, FundRequestStore, OrderLog, ServiceCatalog};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<A, P, L, C, F>
where
    A: AccountStore,
    P: ProviderGateway,
    L: OrderLog,
    C: ServiceCatalog,
    F: FundRequestStore,
{
    pub placement: OrderPlacement<A, P, L>,
    pub accounts: A,
    pub orders: L,
    pub catalog: C,
    pub fund_requests: F,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    /// The authenticated user, when one is present.
    pub user_id: Option<String>,
    /// Provider-side service id from the catalog.
    pub service: u32,
    pub link: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct PlacedOrderResponse {
    pub order_id: String,
    pub display_id: String,
    pub provider_order_id: u64,
    pub charge: Decimal,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub display_id: String,
    pub service: u32,
    pub service_name: String,
    pub link: String,
    pub quantity: u32,
    pub charge: Decimal,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub provider_order_id: u64,
}

impl OrderResponse {
    fn from_record(id: OrderId, order: Order) -> Self {
        Self {
            id: id.to_string(),
            display_id: order.display_id.to_string(),
            service: order.service_id,
            service_name: order.service_name,
            link: order.link,
            quantity: order.quantity,
            charge: order.charge,
            created_at: order.created_at,
            status: order.status.to_string(),
            provider_order_id: order.provider_order_id,
        }
    }
}

// -- Handlers --

/// POST /orders — run the order placement saga.
#[tracing::instrument(skip(state, req))]
pub async fn place<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrderResponse>), ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let identity = match &req.user_id {
        Some(id_str) => {
            let uuid = uuid::Uuid::parse_str(id_str)
                .map_err(|e| ApiError::BadRequest(format!("Invalid user_id: {e}")))?;
            Some(UserId::from_uuid(uuid))
        }
        None => None,
    };

    let service = state
        .catalog
        .get(req.service)
        .await?
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown service: {}", req.service)))?;
    if !service.enabled {
        return Err(ApiError::BadRequest(format!(
            "Service {} is not available",
            req.service
        )));
    }

    let placed = state
        .placement
        .place(
            identity,
            OrderIntent {
                service,
                link: req.link,
                quantity: req.quantity,
            },
        )
        .await?;

    let response = PlacedOrderResponse {
        order_id: placed.order_id.to_string(),
        display_id: placed.display_id.to_string(),
        provider_order_id: placed.provider_order_id,
        charge: placed.charge,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders?user_id= — a user's order history, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let user_id = parse_user_id(&query.user_id)?;
    let orders = state.orders.orders_for_user(user_id).await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|(id, order)| OrderResponse::from_record(id, order))
            .collect(),
    ))
}

/// GET /orders/:id — a single order by storage key.
#[tracing::instrument(skip(state))]
pub async fn get<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    let order_id = OrderId::from_uuid(uuid);

    let order = state
        .orders
        .get(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(OrderResponse::from_record(order_id, order)))
}

pub(crate) fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user_id: {e}")))?;
    Ok(UserId::from_uuid(uuid))
}
