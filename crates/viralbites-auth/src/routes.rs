//! Axum routes for the OAuth start redirect and callback.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::sync::{mpsc, Mutex};
use viralbites_core::{AppConfig, SocialPlatform};

use crate::error::AuthError;
use crate::message::{callback_page, AuthMessage};
use crate::provider::OAuthProvider;

/// How long an issued `state` value stays redeemable.
const STATE_TTL: Duration = Duration::from_secs(600);

/// Upper bound on outstanding `state` values. The oldest is evicted first.
const MAX_PENDING_STATES: usize = 256;

#[derive(Debug)]
struct PendingState {
    nonce: String,
    platform: SocialPlatform,
    issued_at: Instant,
}

/// Shared state for the OAuth routes.
#[derive(Debug, Clone)]
pub struct OAuthState {
    http: reqwest::Client,
    providers: Arc<HashMap<SocialPlatform, OAuthProvider>>,
    pending: Arc<Mutex<VecDeque<PendingState>>>,
    relay: Option<mpsc::Sender<AuthMessage>>,
    target_origin: Option<String>,
}

impl OAuthState {
    #[must_use]
    pub fn new(http: reqwest::Client, providers: impl IntoIterator<Item = OAuthProvider>) -> Self {
        Self {
            http,
            providers: Arc::new(
                providers
                    .into_iter()
                    .map(|p| (p.platform(), p))
                    .collect(),
            ),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            relay: None,
            target_origin: None,
        }
    }

    /// Builds the state with a provider for every platform whose
    /// credentials are configured. Callback pages post to the frontend origin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let providers: Vec<OAuthProvider> = [SocialPlatform::Instagram, SocialPlatform::YouTube]
            .into_iter()
            .filter_map(|platform| match OAuthProvider::from_config(platform, config) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!(%platform, error = %e, "OAuth provider disabled");
                    None
                }
            })
            .collect();

        Ok(Self::new(http, providers).with_target_origin(config.frontend_origin.clone()))
    }

    /// Forwards every callback outcome to `relay` in addition to rendering
    /// the callback page.
    #[must_use]
    pub fn with_relay(mut self, relay: mpsc::Sender<AuthMessage>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Sets the only origin the callback page will post its message to.
    #[must_use]
    pub fn with_target_origin(mut self, origin: impl Into<String>) -> Self {
        self.target_origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn is_configured(&self, platform: SocialPlatform) -> bool {
        self.providers.contains_key(&platform)
    }

    async fn issue_state(&self, platform: SocialPlatform) -> String {
        let nonce = format!("{:032x}", rand::random::<u128>());
        let mut pending = self.pending.lock().await;
        pending.retain(|p| p.issued_at.elapsed() < STATE_TTL);
        while pending.len() >= MAX_PENDING_STATES {
            pending.pop_front();
        }
        pending.push_back(PendingState {
            nonce: nonce.clone(),
            platform,
            issued_at: Instant::now(),
        });
        nonce
    }

    /// Redeems a previously issued `state`. Each value works once.
    async fn consume_state(&self, platform: SocialPlatform, state: Option<&str>) -> bool {
        let Some(state) = state else {
            return false;
        };
        let mut pending = self.pending.lock().await;
        pending.retain(|p| p.issued_at.elapsed() < STATE_TTL);
        let position = pending.iter().position(|p| {
            p.platform == platform && bool::from(p.nonce.as_bytes().ct_eq(state.as_bytes()))
        });
        match position {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    async fn relay(&self, message: &AuthMessage) {
        if let Some(tx) = &self.relay {
            if tx.send(message.clone()).await.is_err() {
                tracing::debug!("auth relay receiver dropped");
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// `GET /auth/{platform}` and `GET /auth/{platform}/callback`.
pub fn oauth_router<S>(state: OAuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/auth/{platform}", get(start_auth))
        .route("/auth/{platform}/callback", get(auth_callback))
        .with_state(state)
}

fn resolve<'a>(
    state: &'a OAuthState,
    platform: &str,
) -> Result<(SocialPlatform, &'a OAuthProvider), Response> {
    let platform: SocialPlatform = platform
        .parse()
        .map_err(|_| (StatusCode::NOT_FOUND, "Unknown platform").into_response())?;
    let provider = state.providers.get(&platform).ok_or_else(|| {
        tracing::warn!(%platform, "sign-in requested for unconfigured platform");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            AuthError::NotConfigured(platform).to_string(),
        )
            .into_response()
    })?;
    Ok((platform, provider))
}

async fn start_auth(State(state): State<OAuthState>, Path(platform): Path<String>) -> Response {
    let (platform, provider) = match resolve(&state, &platform) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let nonce = state.issue_state(platform).await;
    tracing::info!(%platform, "redirecting to provider consent page");
    Redirect::to(&provider.authorize_url(&nonce)).into_response()
}

async fn auth_callback(
    State(state): State<OAuthState>,
    Path(platform): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (platform, provider) = match resolve(&state, &platform) {
        Ok(found) => found,
        Err(response) => return response,
    };

    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        tracing::warn!(%platform, reason = %reason, "provider denied authorization");
        return finish(&state, StatusCode::OK, AuthMessage::error(platform, reason)).await;
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "No code provided").into_response();
    };

    if !state.consume_state(platform, params.state.as_deref()).await {
        tracing::warn!(%platform, "callback with unknown or expired state");
        return finish(
            &state,
            StatusCode::BAD_REQUEST,
            AuthMessage::error(platform, "Invalid or expired sign-in attempt"),
        )
        .await;
    }

    match provider.exchange_code(&state.http, &code).await {
        Ok(token) => {
            tracing::info!(%platform, "OAuth token exchange succeeded");
            finish(&state, StatusCode::OK, AuthMessage::success(platform, token)).await
        }
        Err(e) => {
            tracing::error!(%platform, error = %e, "OAuth token exchange failed");
            finish(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                AuthMessage::error(platform, "Authentication failed"),
            )
            .await
        }
    }
}

async fn finish(state: &OAuthState, status: StatusCode, message: AuthMessage) -> Response {
    state.relay(&message).await;
    let page = callback_page(&message, state.target_origin.as_deref());
    (status, Html(page)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use viralbites_core::OAuthCredentials;

    fn state() -> OAuthState {
        let provider = OAuthProvider::new(
            SocialPlatform::YouTube,
            OAuthCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
            "http://localhost:3000",
        );
        OAuthState::new(reqwest::Client::new(), [provider])
    }

    #[tokio::test]
    async fn issued_state_redeems_once_for_its_platform() {
        let state = state();
        let nonce = state.issue_state(SocialPlatform::YouTube).await;
        assert_eq!(nonce.len(), 32);

        assert!(!state.consume_state(SocialPlatform::Instagram, Some(&nonce)).await);
        assert!(state.consume_state(SocialPlatform::YouTube, Some(&nonce)).await);
        assert!(!state.consume_state(SocialPlatform::YouTube, Some(&nonce)).await);
    }

    #[tokio::test]
    async fn missing_or_unknown_state_is_rejected() {
        let state = state();
        assert!(!state.consume_state(SocialPlatform::YouTube, None).await);
        assert!(!state.consume_state(SocialPlatform::YouTube, Some("forged")).await);
    }

    #[tokio::test]
    async fn pending_states_are_capped_oldest_first() {
        let state = state();
        let oldest = state.issue_state(SocialPlatform::YouTube).await;
        let second = state.issue_state(SocialPlatform::YouTube).await;
        for _ in 2..MAX_PENDING_STATES {
            state.issue_state(SocialPlatform::YouTube).await;
        }
        let newest = state.issue_state(SocialPlatform::YouTube).await;

        assert_eq!(state.pending.lock().await.len(), MAX_PENDING_STATES);
        assert!(!state.consume_state(SocialPlatform::YouTube, Some(&oldest)).await);
        assert!(state.consume_state(SocialPlatform::YouTube, Some(&second)).await);
        assert!(state.consume_state(SocialPlatform::YouTube, Some(&newest)).await);
    }

    #[test]
    fn only_configured_platforms_are_enabled() {
        let state = state();
        assert!(state.is_configured(SocialPlatform::YouTube));
        assert!(!state.is_configured(SocialPlatform::Instagram));
    }
}
