//! OAuth connect support for Instagram and YouTube.
//!
//! The backend half is an axum router that redirects to the provider,
//! exchanges the returned code for a token, and relays the outcome to the
//! opener. The client half ([`Connector`]) waits for exactly one outcome.

pub mod connect;
pub mod error;
pub mod message;
pub mod provider;
pub mod routes;

pub use connect::{ConnectResponse, ConnectSources, Connector};
pub use error::AuthError;
pub use message::{callback_page, AuthMessage};
pub use provider::OAuthProvider;
pub use routes::{oauth_router, OAuthState};
