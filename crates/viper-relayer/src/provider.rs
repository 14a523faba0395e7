//! Transport that delivers relays to service nodes.

use crate::error::{ProviderError, RelayError};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use viper_core::protocol::constants::CLIENT_RELAY_ROUTE;
use viper_core::{RelayInput, RelayOutput};

/// Default timeout for a relay round trip (in seconds).
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;

/// Per-call overrides for a relay request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayRequestOptions {
    /// Replaces the provider's default timeout for this request.
    pub timeout: Option<Duration>,
}

/// Delivers a relay to the node listening at `service_url`.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn relay(
        &self,
        service_url: &str,
        input: &RelayInput,
        options: Option<&RelayRequestOptions>,
    ) -> Result<RelayOutput, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct RelayErrorResponse {
    error: RelayError,
}

/// [`Provider`] that posts relays as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    http_client: Client,
}

impl HttpProvider {
    /// Create a provider whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }

    /// Create a provider around an existing client.
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn relay(
        &self,
        service_url: &str,
        input: &RelayInput,
        options: Option<&RelayRequestOptions>,
    ) -> Result<RelayOutput, ProviderError> {
        let url = format!("{}{}", service_url.trim_end_matches('/'), CLIENT_RELAY_ROUTE);
        debug!("Posting relay to {}", url);

        let mut request = self
            .http_client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(input);
        if let Some(timeout) = options.and_then(|o| o.timeout) {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let result = parse_relay_response(status, &body);
        if let Err(e) = &result {
            warn!("Relay to {} failed: {}", url, e);
        }
        result
    }
}

/// Map a node's HTTP answer onto a relay output or a provider error.
fn parse_relay_response(status: StatusCode, body: &[u8]) -> Result<RelayOutput, ProviderError> {
    if status.is_success() {
        return serde_json::from_slice(body).map_err(ProviderError::NonJsonResponse);
    }

    if status.is_client_error() {
        return match serde_json::from_slice::<RelayErrorResponse>(body) {
            Ok(response) => Err(ProviderError::Relay(response.error)),
            Err(_) => Err(ProviderError::Client {
                status: status.as_u16(),
            }),
        };
    }

    if status.is_server_error() {
        return Err(ProviderError::Server {
            status: status.as_u16(),
        });
    }

    Err(ProviderError::UnexpectedStatus {
        status: status.as_u16(),
    })
}
