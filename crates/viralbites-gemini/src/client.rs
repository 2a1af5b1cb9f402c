//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Every call is attempted exactly once. Non-2xx responses are decoded from
//! the API's error envelope and classified so that rejected keys surface as
//! [`GeminiError::Unauthorized`] instead of a generic failure.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::{is_auth_rejection, GeminiError};
use crate::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini REST API.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GeminiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("viralbites/0.1 (venue-discovery)")
            .build()?;

        // Exactly one trailing slash so joined paths append instead of
        // replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeminiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Calls `generateContent` on `model`.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::Unauthorized`] if the API rejects the key.
    /// - [`GeminiError::Api`] for any other non-2xx status.
    /// - [`GeminiError::Http`] on network failure.
    /// - [`GeminiError::Deserialize`] if the body does not match the response shape.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.endpoint(model)?;
        tracing::debug!(model, tools = request.tools.len(), "calling generateContent");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Self::classify_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
            context: format!("generateContent(model={model})"),
            source: e,
        })
    }

    /// Builds `{base}/v1beta/models/{model}:generateContent`.
    fn endpoint(&self, model: &str) -> Result<Url, GeminiError> {
        self.base_url
            .join(&format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| GeminiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Maps a non-2xx status plus body to a typed error.
    fn classify_error(status: u16, body: &str) -> GeminiError {
        let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.status),
            Err(_) => (body.trim().to_string(), None),
        };

        let permission_denied = matches!(
            api_status.as_deref(),
            Some("PERMISSION_DENIED" | "UNAUTHENTICATED")
        );

        if permission_denied || is_auth_rejection(status, &message) {
            GeminiError::Unauthorized { status, message }
        } else {
            GeminiError::Api { status, message }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
