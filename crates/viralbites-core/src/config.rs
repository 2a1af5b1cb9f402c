use crate::app_config::{AppConfig, Environment, OAuthCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if env var values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if env var values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let credentials = |id_var: &str, secret_var: &str| -> Option<OAuthCredentials> {
        Some(OAuthCredentials {
            client_id: optional(id_var)?,
            client_secret: optional(secret_var)?,
        })
    };

    let env = parse_environment(&or_default("VIRALBITES_ENV", "development"));
    let bind_addr = parse_addr("VIRALBITES_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VIRALBITES_LOG_LEVEL", "info");
    let public_url = or_default("VIRALBITES_PUBLIC_URL", "http://localhost:3000")
        .trim_end_matches('/')
        .to_string();
    let frontend_origin = or_default("VIRALBITES_FRONTEND_ORIGIN", "http://localhost:5173");

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_base_url = or_default(
        "GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    );
    let discovery_model = or_default("VIRALBITES_DISCOVERY_MODEL", "gemini-3-flash-preview");
    let verification_model = or_default("VIRALBITES_VERIFICATION_MODEL", "gemini-2.5-flash");
    let request_timeout_secs = parse_u64("VIRALBITES_REQUEST_TIMEOUT_SECS", "60")?;
    let connect_timeout_secs = parse_u64("VIRALBITES_CONNECT_TIMEOUT_SECS", "300")?;

    let instagram = credentials("INSTAGRAM_CLIENT_ID", "INSTAGRAM_CLIENT_SECRET");
    let google = credentials("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        public_url,
        frontend_origin,
        gemini_api_key,
        gemini_base_url,
        discovery_model,
        verification_model,
        request_timeout_secs,
        connect_timeout_secs,
        instagram,
        google,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
