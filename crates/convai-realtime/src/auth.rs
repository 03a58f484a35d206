//! Signed-URL authorization exchange against the ElevenLabs API.

use async_trait::async_trait;
use helpline_core::auth::{AuthError, SessionAuthorizer, SignedSessionUrl};
use helpline_core::credentials::Credentials;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default ElevenLabs API base URL.
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

const SIGNED_URL_PATH: &str = "/v1/convai/conversation/get_signed_url";

/// Default bound on the signed-URL request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Trades an API key and agent ID for a signed conversation URL.
///
/// Sends a GET to `/v1/convai/conversation/get_signed_url` with the agent ID
/// as a query parameter and the API key in the `xi-api-key` header. The key
/// never appears in the URL or in any error this client produces.
pub struct ConvaiAuthorizer {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ConvaiAuthorizer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Points the exchange at a different host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ConvaiAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionAuthorizer for ConvaiAuthorizer {
    async fn authorize(&self, credentials: &Credentials) -> Result<SignedSessionUrl, AuthError> {
        let url = format!("{}{}", self.base_url, SIGNED_URL_PATH);
        debug!(agent_id = credentials.agent_id(), "requesting signed session URL");

        let response = self
            .client
            .get(&url)
            .query(&[("agent_id", credentials.agent_id())])
            .header("xi-api-key", credentials.api_key())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    AuthError::TimedOut
                } else {
                    AuthError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(AuthError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let payload: SignedUrlResponse = response
            .json()
            .await
            .map_err(|error| AuthError::MalformedResponse(error.to_string()))?;
        debug!("received signed session URL");
        Ok(SignedSessionUrl::new(payload.signed_url))
    }
}
