//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server and provider configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `PROVIDER_API_URL` — SMM provider endpoint
/// - `PROVIDER_API_KEY` — SMM provider API key (default: empty)
/// - `PROVIDER_TIMEOUT_SECS` — provider request deadline (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub provider_api_url: String,
    pub provider_api_key: String,
    pub provider_timeout: Duration,
}

const DEFAULT_PROVIDER_URL: &str = "https://www.smmservices24.com/api/v2";

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            provider_api_url: std::env::var("PROVIDER_API_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_URL.to_string()),
            provider_api_key: std::env::var("PROVIDER_API_KEY").unwrap_or_default(),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            provider_api_url: DEFAULT_PROVIDER_URL.to_string(),
            provider_api_key: String::new(),
            provider_timeout: Duration::from_secs(30),
        }
    }
}
