//! Shared configuration and domain model for ViralBites.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod settings;
pub mod venue;

pub use app_config::{AppConfig, Environment, OAuthCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, Coordinates};
pub use settings::{SocialPlatform, UserSettings};
pub use venue::{Candidate, Source, VenuePlace, VideoLink, VideoPlatform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
