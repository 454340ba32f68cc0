//! Fund request endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::FundRequestId;
use domain::{Currency, FundRequest, FundRequestStatus};
use rust_decimal::Decimal;
use saga::ProviderGateway;
use serde::{Deserialize, Serialize};
use store::{AccountStore, FundRequestStore, OrderLog, ServiceCatalog, Transition};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_user_id};

// -- Request / response types --

#[derive(Debug, Deserialize)]
pub struct CreateFundRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub method: String,
    pub transaction_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FundRequestsQuery {
    pub user_id: String,
}

#[derive(Serialize)]
pub struct FundRequestResponse {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub transaction_id: String,
    pub status: String,
}

impl FundRequestResponse {
    fn from_record(id: FundRequestId, request: FundRequest) -> Self {
        Self {
            id: id.to_string(),
            user_id: request.user_id.to_string(),
            amount: request.amount,
            currency: request.currency.to_string(),
            method: request.method,
            transaction_id: request.transaction_ref,
            status: request.status.to_string(),
        }
    }
}

// -- Handlers --

/// POST /fund-requests — file a pending top-up request.
#[tracing::instrument(skip(state, req))]
pub async fn create<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Json(req): Json<CreateFundRequest>,
) -> Result<(StatusCode, Json<FundRequestResponse>), ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    if req.amount <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "Amount must be positive".to_string(),
        ));
    }

    let user_id = parse_user_id(&req.user_id)?;
    let account = state
        .accounts
        .get(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Account {} not found", req.user_id)))?;

    let request = FundRequest::new(
        user_id,
        account.email,
        req.amount,
        req.currency,
        req.method,
        req.transaction_id,
    );
    let id = state.fund_requests.insert(request.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(FundRequestResponse::from_record(id, request)),
    ))
}

/// GET /fund-requests?user_id= — a user's requests, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Query(query): Query<FundRequestsQuery>,
) -> Result<Json<Vec<FundRequestResponse>>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let user_id = parse_user_id(&query.user_id)?;
    let requests = state.fund_requests.requests_for_user(user_id).await?;

    Ok(Json(
        requests
            .into_iter()
            .map(|(id, request)| FundRequestResponse::from_record(id, request))
            .collect(),
    ))
}

/// POST /fund-requests/:id/complete — approve a request and credit the
/// amount to the account balance.
///
/// The request is marked `Completed` before the credit runs; the status
/// transition is what guards against crediting twice.
#[tracing::instrument(skip(state))]
pub async fn complete<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Path(id): Path<String>,
) -> Result<Json<FundRequestResponse>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let request_id = parse_fund_request_id(&id)?;
    let request = state
        .fund_requests
        .resolve(request_id, FundRequestStatus::Completed)
        .await?;

    let amount = request.amount;
    let credit = state
        .accounts
        .transact(request.user_id, |current| match current {
            Some(account) => Transition::Update(account.credited(amount)),
            None => Transition::Abort,
        })
        .await?;

    if !credit.committed {
        tracing::error!(%request_id, user_id = %request.user_id, "fund request completed but account record is missing");
        return Err(ApiError::Internal(format!(
            "Account {} not found while crediting fund request",
            request.user_id
        )));
    }

    metrics::counter!("fund_requests_completed").increment(1);
    Ok(Json(FundRequestResponse::from_record(request_id, request)))
}

/// POST /fund-requests/:id/cancel — reject a pending request.
#[tracing::instrument(skip(state))]
pub async fn cancel<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Path(id): Path<String>,
) -> Result<Json<FundRequestResponse>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let request_id = parse_fund_request_id(&id)?;
    let request = state
        .fund_requests
        .resolve(request_id, FundRequestStatus::Cancelled)
        .await?;

    Ok(Json(FundRequestResponse::from_record(request_id, request)))
}

fn parse_fund_request_id(id: &str) -> Result<FundRequestId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid fund request id: {e}")))?;
    Ok(FundRequestId::from_uuid(uuid))
}
