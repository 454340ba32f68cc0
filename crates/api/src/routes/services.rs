//! Service catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domain::Service;
use rust_decimal::Decimal;
use saga::ProviderGateway;
use serde::{Deserialize, Serialize};
use store::{AccountStore, FundRequestStore, OrderLog, ServiceCatalog};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub service: u32,
    pub name: String,
    pub details: String,
    pub rate: Decimal,
    pub min: u32,
    pub max: u32,
    pub category: String,
    pub refill: bool,
}

impl From<Service> for ServiceResponse {
    fn from(s: Service) -> Self {
        Self {
            service: s.provider_service_id,
            name: s.name,
            details: s.details,
            rate: s.rate,
            min: s.min,
            max: s.max,
            category: s.category,
            refill: s.refill,
        }
    }
}

/// GET /services — enabled services, optionally filtered by category.
#[tracing::instrument(skip(state))]
pub async fn list<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<Vec<ServiceResponse>>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let services = match &query.category {
        Some(category) => state.catalog.services_in_category(category).await?,
        None => state.catalog.list_services().await?,
    };

    Ok(Json(services.into_iter().map(Into::into).collect()))
}

/// GET /categories — category names with at least one enabled service.
#[tracing::instrument(skip(state))]
pub async fn categories<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
) -> Result<Json<Vec<String>>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    Ok(Json(state.catalog.list_categories().await?))
}
