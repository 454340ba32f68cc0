//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::{PlaceOrderError, PlacementFailure};
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Order placement failure.
    Placement(PlacementFailure),
    /// Storage error.
    Store(StoreError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, refund_failed) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Placement(failure) => {
                let status = placement_status(&failure.error);
                let refund_failed = failure.compensation.refund_failed();
                (status, failure.to_string(), refund_failed)
            }
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, false)
            }
        };

        let body = if refund_failed {
            serde_json::json!({ "error": message, "refund_failed": true })
        } else {
            serde_json::json!({ "error": message })
        };
        (status, axum::Json(body)).into_response()
    }
}

fn placement_status(error: &PlaceOrderError) -> StatusCode {
    match error {
        PlaceOrderError::MissingLink | PlaceOrderError::Quantity(_) => StatusCode::BAD_REQUEST,
        PlaceOrderError::Auth => StatusCode::UNAUTHORIZED,
        PlaceOrderError::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
        PlaceOrderError::ProviderTransport(_)
        | PlaceOrderError::ProviderTimeout
        | PlaceOrderError::ProviderResponse(_)
        | PlaceOrderError::ProviderProtocol => StatusCode::BAD_GATEWAY,
        PlaceOrderError::Store(_) | PlaceOrderError::OrderPersist(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String, bool) {
    let status = match &err {
        StoreError::FundRequestNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::FundRequestResolved(_) => StatusCode::CONFLICT,
        StoreError::Unavailable(_) | StoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string(), false)
}

impl From<PlacementFailure> for ApiError {
    fn from(failure: PlacementFailure) -> Self {
        ApiError::Placement(failure)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}
