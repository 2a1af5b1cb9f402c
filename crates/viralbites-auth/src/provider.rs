//! OAuth authorization-code providers for Instagram and YouTube (Google).

use reqwest::{Client, Url};
use serde::Deserialize;
use viralbites_core::{AppConfig, OAuthCredentials, SocialPlatform};

use crate::error::AuthError;

const INSTAGRAM_AUTHORIZE_URL: &str = "https://api.instagram.com/oauth/authorize";
const INSTAGRAM_TOKEN_URL: &str = "https://api.instagram.com/oauth/access_token";
const INSTAGRAM_SCOPE: &str = "user_profile,user_media";

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// One platform's OAuth application plus its provider endpoints.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    platform: SocialPlatform,
    credentials: OAuthCredentials,
    redirect_uri: String,
    authorize_url: Url,
    token_url: Url,
}

impl OAuthProvider {
    /// Provider for `platform` with its production endpoints. The redirect
    /// URI is `{public_url}/auth/{slug}/callback`.
    ///
    /// # Panics
    ///
    /// If a built-in endpoint constant fails to parse.
    #[must_use]
    pub fn new(platform: SocialPlatform, credentials: OAuthCredentials, public_url: &str) -> Self {
        let (authorize, token) = match platform {
            SocialPlatform::Instagram => (INSTAGRAM_AUTHORIZE_URL, INSTAGRAM_TOKEN_URL),
            SocialPlatform::YouTube => (GOOGLE_AUTHORIZE_URL, GOOGLE_TOKEN_URL),
        };
        Self {
            platform,
            credentials,
            redirect_uri: format!(
                "{}/auth/{}/callback",
                public_url.trim_end_matches('/'),
                platform.slug()
            ),
            authorize_url: Url::parse(authorize).expect("static authorize URL is valid"),
            token_url: Url::parse(token).expect("static token URL is valid"),
        }
    }

    /// Provider for `platform` using the credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] if the platform's client id or
    /// secret is not set.
    pub fn from_config(platform: SocialPlatform, config: &AppConfig) -> Result<Self, AuthError> {
        let credentials = match platform {
            SocialPlatform::Instagram => config.instagram.clone(),
            SocialPlatform::YouTube => config.google.clone(),
        }
        .ok_or(AuthError::NotConfigured(platform))?;

        Ok(Self::new(platform, credentials, &config.public_url))
    }

    /// Replaces the token endpoint, e.g. with a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEndpoint`] if `url` does not parse.
    pub fn with_token_url(mut self, url: &str) -> Result<Self, AuthError> {
        self.token_url = Url::parse(url).map_err(|e| AuthError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn platform(&self) -> SocialPlatform {
        self.platform
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The provider consent URL the user is redirected to.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("response_type", "code");
            match self.platform {
                SocialPlatform::Instagram => {
                    query.append_pair("scope", INSTAGRAM_SCOPE);
                }
                SocialPlatform::YouTube => {
                    query
                        .append_pair("scope", YOUTUBE_SCOPE)
                        .append_pair("access_type", "offline");
                }
            }
            query.append_pair("state", state);
        }
        url.into()
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Http`] on transport failure.
    /// - [`AuthError::TokenExchange`] if the provider answered non-2xx.
    /// - [`AuthError::MissingToken`] if the reply has no `access_token`.
    pub async fn exchange_code(&self, client: &Client, code: &str) -> Result<String, AuthError> {
        let response = client
            .post(self.token_url.clone())
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)
    }
}
