use thiserror::Error;
use viralbites_core::SocialPlatform;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0} sign-in is not configured")]
    NotConfigured(SocialPlatform),

    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    #[error("token response did not include an access token")]
    MissingToken,

    #[error("invalid OAuth endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
