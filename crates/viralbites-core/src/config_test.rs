use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(parse_environment("development"), Environment::Development);
}

#[test]
fn parse_environment_production() {
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.public_url, "http://localhost:3000");
    assert_eq!(cfg.frontend_origin, "http://localhost:5173");
    assert_eq!(
        cfg.gemini_base_url,
        "https://generativelanguage.googleapis.com"
    );
    assert_eq!(cfg.discovery_model, "gemini-3-flash-preview");
    assert_eq!(cfg.verification_model, "gemini-2.5-flash");
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.connect_timeout_secs, 300);
    assert!(cfg.gemini_api_key.is_none());
    assert!(cfg.instagram.is_none());
    assert!(cfg.google.is_none());
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("VIRALBITES_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIRALBITES_BIND_ADDR"),
        "expected InvalidEnvVar(VIRALBITES_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("VIRALBITES_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIRALBITES_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(VIRALBITES_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn public_url_trailing_slash_is_trimmed() {
    let mut map = HashMap::new();
    map.insert("VIRALBITES_PUBLIC_URL", "https://bites.example.com/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.public_url, "https://bites.example.com");
}

#[test]
fn oauth_credentials_require_both_id_and_secret() {
    let mut map = HashMap::new();
    map.insert("INSTAGRAM_CLIENT_ID", "ig-id");
    map.insert("GOOGLE_CLIENT_ID", "g-id");
    map.insert("GOOGLE_CLIENT_SECRET", "g-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    assert!(cfg.instagram.is_none(), "secret missing, should be None");
    let google = cfg.google.expect("google credentials");
    assert_eq!(google.client_id, "g-id");
    assert_eq!(google.client_secret, "g-secret");
}

#[test]
fn blank_api_key_is_treated_as_missing() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(matches!(
        cfg.require_gemini_api_key(),
        Err(ConfigError::MissingEnvVar(ref v)) if v == "GEMINI_API_KEY"
    ));
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "AIza-super-secret");
    map.insert("GOOGLE_CLIENT_ID", "g-id");
    map.insert("GOOGLE_CLIENT_SECRET", "g-very-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");

    assert!(!rendered.contains("AIza-super-secret"));
    assert!(!rendered.contains("g-very-secret"));
    assert!(rendered.contains("[redacted]"));
}
