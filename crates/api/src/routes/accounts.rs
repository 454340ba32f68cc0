//! Account registration and balance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use domain::Account;
use rust_decimal::Decimal;
use saga::ProviderGateway;
use serde::{Deserialize, Serialize};
use store::{AccountStore, FundRequestStore, OrderLog, ServiceCatalog, Transition};

use crate::error::ApiError;
use crate::routes::orders::{AppState, parse_user_id};

/// Balance granted to every new account.
pub const SIGNUP_BONUS: Decimal = Decimal::TWO;

/// Balance credited to the referrer when a referred account registers.
pub const REFERRAL_BONUS: Decimal = Decimal::TWO;

// -- Request / response types --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub referred_by: Option<String>,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub user_id: String,
    pub email: String,
    pub balance: Decimal,
}

// -- Handlers --

/// POST /accounts — register a new account with the signup bonus.
///
/// When a referrer is supplied, the referral bonus is credited to them
/// best-effort: a failed referrer credit does not fail registration.
#[tracing::instrument(skip(state, req))]
pub async fn register<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("An email is required".to_string()));
    }

    let referrer = match &req.referred_by {
        Some(id_str) => Some(parse_user_id(id_str)?),
        None => None,
    };

    let user_id = UserId::new();
    let mut account = Account::new(req.email.clone(), SIGNUP_BONUS);
    if let Some(referrer) = referrer {
        account = account.referred_by(referrer);
    }
    state.accounts.put(user_id, account.clone()).await?;

    if let Some(referrer) = referrer {
        let credit = state
            .accounts
            .transact(referrer, |current| match current {
                Some(referrer_account) => {
                    Transition::Update(referrer_account.credited(REFERRAL_BONUS))
                }
                None => Transition::Abort,
            })
            .await;
        match credit {
            Ok(outcome) if outcome.committed => {
                tracing::info!(%referrer, "referral bonus credited");
            }
            Ok(_) => tracing::warn!(%referrer, "referral bonus skipped: no such account"),
            Err(e) => tracing::warn!(%referrer, error = %e, "failed to credit referral bonus"),
        }
    }

    let response = AccountResponse {
        user_id: user_id.to_string(),
        email: account.email,
        balance: account.balance,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /accounts/:id — account balance view.
#[tracing::instrument(skip(state))]
pub async fn get<A, P, L, C, F>(
    State(state): State<Arc<AppState<A, P, L, C, F>>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError>
where
    A: AccountStore + 'static,
    P: ProviderGateway + 'static,
    L: OrderLog + 'static,
    C: ServiceCatalog + 'static,
    F: FundRequestStore + 'static,
{
    let user_id = parse_user_id(&id)?;
    let account = state
        .accounts
        .get(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Account {id} not found")))?;

    Ok(Json(AccountResponse {
        user_id: user_id.to_string(),
        email: account.email,
        balance: account.balance,
    }))
}
