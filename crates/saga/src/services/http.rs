//! HTTP provider gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{AddOrder, ProviderError, ProviderGateway};

/// Gateway to an SMM provider speaking the common panel API: a form POST
/// with an API key and an `add` action, answered with JSON carrying
/// either an `order` id or an `error` message.
pub struct HttpProviderGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Response body of the add-order call.
#[derive(Debug, Deserialize)]
struct AddOrderResponse {
    #[serde(default)]
    order: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpProviderGateway {
    /// Creates a gateway with the given endpoint, key, and request
    /// deadline. Expiry of the deadline is reported as
    /// [`ProviderError::Timeout`].
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

fn interpret(body: AddOrderResponse) -> Result<u64, ProviderError> {
    if let Some(error) = body.error {
        return Err(ProviderError::Rejected(error));
    }
    body.order.ok_or(ProviderError::Protocol)
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn add_order(&self, request: AddOrder) -> Result<u64, ProviderError> {
        let params = [
            ("key", self.api_key.clone()),
            ("action", "add".to_string()),
            ("service", request.service.to_string()),
            ("link", request.link),
            ("quantity", request.quantity.to_string()),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let body: AddOrderResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                // a body we cannot parse carries no usable order id
                ProviderError::Protocol
            }
        })?;

        interpret(body)
    }
}
