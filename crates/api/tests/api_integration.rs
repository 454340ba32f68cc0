//! Integration tests for the API server.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::UserId;
use domain::{Account, Service};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use saga::InMemoryProviderGateway;
use saga::ProviderBehavior;
use store::{
    AccountStore, InMemoryAccountStore, InMemoryFundRequestStore, InMemoryOrderLog,
    InMemoryServiceCatalog,
};
use tower::ServiceExt;

use api::routes::orders::AppState;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

type InMemoryState = Arc<
    AppState<
        InMemoryAccountStore,
        InMemoryProviderGateway,
        InMemoryOrderLog,
        InMemoryServiceCatalog,
        InMemoryFundRequestStore,
    >,
>;

fn setup() -> (axum::Router, InMemoryState, InMemoryProviderGateway) {
    let accounts = InMemoryAccountStore::new();
    let provider = InMemoryProviderGateway::new();
    let orders = InMemoryOrderLog::new();
    let catalog = InMemoryServiceCatalog::new();
    let fund_requests = InMemoryFundRequestStore::new();

    let state = api::create_state(accounts, provider.clone(), orders, catalog, fund_requests);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, provider)
}

async fn seed_service(state: &InMemoryState) -> u32 {
    state
        .catalog
        .upsert(Service {
            provider_service_id: 42,
            name: "TikTok Views".to_string(),
            details: "Fast delivery".to_string(),
            rate: Decimal::from(10),
            min: 100,
            max: 10_000,
            category: "TikTok".to_string(),
            refill: false,
            enabled: true,
        })
        .await;
    42
}

async fn seed_account(state: &InMemoryState, balance: Decimal) -> UserId {
    let user = UserId::new();
    state
        .accounts
        .put(user, Account::new("user@example.com", balance))
        .await
        .unwrap();
    user
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn decimal(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("expected a decimal string")).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let state = api::create_in_memory_state();
    let app = api::create_app(state, get_metrics_handle());
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_register_grants_signup_bonus() {
    let (app, _, _) = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/accounts",
        Some(serde_json::json!({ "email": "new@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email"], "new@example.com");
    assert_eq!(decimal(&json["balance"]), Decimal::TWO);
}

#[tokio::test]
async fn test_register_credits_referrer() {
    let (app, state, _) = setup();
    let referrer = seed_account(&state, Decimal::from(10)).await;

    let (status, _) = send(
        &app,
        "POST",
        "/accounts",
        Some(serde_json::json!({
            "email": "referred@example.com",
            "referred_by": referrer.to_string(),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let balance = state.accounts.get(referrer).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(12));
}

#[tokio::test]
async fn test_place_order_happy_path() {
    let (app, state, provider) = setup();
    let service = seed_service(&state).await;
    let user = seed_account(&state, Decimal::from(100)).await;
    provider.set_next_order_id(555);

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "service": service,
            "link": "https://example.com/video/1",
            "quantity": 1000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["provider_order_id"], 555);
    assert_eq!(decimal(&json["charge"]), Decimal::from(10));

    let display_id = json["display_id"].as_str().unwrap();
    assert_eq!(display_id.len(), 6);
    assert!(display_id.chars().all(|c| c.is_ascii_digit()));

    // the charge came off the balance
    let (status, json) = send(&app, "GET", &format!("/accounts/{user}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["balance"]), Decimal::from(90));

    // the order shows up in history
    let (status, json) = send(&app, "GET", &format!("/orders?user_id={user}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "Pending");
    assert_eq!(orders[0]["provider_order_id"], 555);
}

#[tokio::test]
async fn test_place_order_insufficient_funds() {
    let (app, state, _) = setup();
    let service = seed_service(&state).await;
    let user = seed_account(&state, Decimal::from(5)).await;

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "service": service,
            "link": "https://example.com/video/1",
            "quantity": 1000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(json["error"].as_str().unwrap().contains("too low"));

    let balance = state.accounts.get(user).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(5));
}

#[tokio::test]
async fn test_place_order_without_identity_is_unauthorized() {
    let (app, state, _) = setup();
    let service = seed_service(&state).await;

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "service": service,
            "link": "https://example.com/video/1",
            "quantity": 1000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_place_order_unknown_service() {
    let (app, state, _) = setup();
    let user = seed_account(&state, Decimal::from(100)).await;

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "service": 9999,
            "link": "https://example.com/video/1",
            "quantity": 1000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_quantity_out_of_bounds() {
    let (app, state, _) = setup();
    let service = seed_service(&state).await;
    let user = seed_account(&state, Decimal::from(100)).await;

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "service": service,
            "link": "https://example.com/video/1",
            "quantity": 50,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("minimum"));
}

#[tokio::test]
async fn test_provider_rejection_maps_to_bad_gateway_and_refunds() {
    let (app, state, provider) = setup();
    let service = seed_service(&state).await;
    let user = seed_account(&state, Decimal::from(100)).await;
    provider.set_behavior(ProviderBehavior::Reject("invalid link".to_string()));

    let (status, json) = send(
        &app,
        "POST",
        "/orders",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "service": service,
            "link": "https://example.com/video/1",
            "quantity": 1000,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("invalid link"));
    assert!(json.get("refund_failed").is_none());

    let balance = state.accounts.get(user).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(100));
}

#[tokio::test]
async fn test_services_listing_by_category() {
    let (app, state, _) = setup();
    seed_service(&state).await;

    let (status, json) = send(&app, "GET", "/services?category=TikTok", None).await;
    assert_eq!(status, StatusCode::OK);
    let services = json.as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["service"], 42);
    assert_eq!(services[0]["name"], "TikTok Views");

    let (status, json) = send(&app, "GET", "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fund_request_lifecycle_credits_once() {
    let (app, state, _) = setup();
    let user = seed_account(&state, Decimal::from(10)).await;

    let (status, json) = send(
        &app,
        "POST",
        "/fund-requests",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "amount": "50",
            "currency": "BDT",
            "method": "bKash",
            "transaction_id": "TX12345",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "Pending");
    let request_id = json["id"].as_str().unwrap().to_string();

    // completing credits the balance
    let (status, json) = send(
        &app,
        "POST",
        &format!("/fund-requests/{request_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Completed");

    let balance = state.accounts.get(user).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(60));

    // completing again conflicts and does not credit twice
    let (status, _) = send(
        &app,
        "POST",
        &format!("/fund-requests/{request_id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let balance = state.accounts.get(user).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(60));
}

#[tokio::test]
async fn test_cancel_fund_request_does_not_credit() {
    let (app, state, _) = setup();
    let user = seed_account(&state, Decimal::from(10)).await;

    let (_, json) = send(
        &app,
        "POST",
        "/fund-requests",
        Some(serde_json::json!({
            "user_id": user.to_string(),
            "amount": "50",
            "currency": "USD",
            "method": "TRC20",
            "transaction_id": "TX99",
        })),
    )
    .await;
    let request_id = json["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/fund-requests/{request_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Cancelled");

    let balance = state.accounts.get(user).await.unwrap().unwrap().balance;
    assert_eq!(balance, Decimal::from(10));
}
