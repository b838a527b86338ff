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

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STORESCORE_API_URL", "https://api.storescore.test/api/v1");
    m.insert("STORESCORE_ORG_ID", "7");
    m
}

#[test]
fn parse_environment_accepts_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STORESCORE_ENV"));
}

#[test]
fn build_app_config_fails_without_api_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORESCORE_API_URL"),
        "expected MissingEnvVar(STORESCORE_API_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_org_id() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("STORESCORE_API_URL", "https://api.storescore.test");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORESCORE_ORG_ID"),
        "expected MissingEnvVar(STORESCORE_ORG_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_org_id() {
    let mut map = full_env();
    map.insert("STORESCORE_ORG_ID", "acme");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_ORG_ID"),
        "expected InvalidEnvVar(STORESCORE_ORG_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_org_id() {
    let mut map = full_env();
    map.insert("STORESCORE_ORG_ID", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_ORG_ID"
    ));
}

#[test]
fn build_app_config_rejects_url_without_scheme() {
    let mut map = full_env();
    map.insert("STORESCORE_API_URL", "api.storescore.test");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_API_URL"
    ));
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.api_url, "https://api.storescore.test/api/v1");
    assert_eq!(cfg.org_id, OrgId(7));
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.maps_api_key.is_none());
    assert!(!cfg.maps_enabled());
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "storescore/0.1 (region-manager)");
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
}

#[test]
fn maps_key_enables_map_view() {
    let mut map = full_env();
    map.insert("STORESCORE_MAPS_API_KEY", "maps-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.maps_enabled());
}

#[test]
fn blank_optional_values_are_treated_as_absent() {
    let mut map = full_env();
    map.insert("STORESCORE_MAPS_API_KEY", "  ");
    map.insert("STORESCORE_API_TOKEN", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.maps_api_key.is_none());
    assert!(cfg.api_token.is_none());
}

#[test]
fn request_timeout_override() {
    let mut map = full_env();
    map.insert("STORESCORE_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 60);
}

#[test]
fn request_timeout_invalid() {
    let mut map = full_env();
    map.insert("STORESCORE_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(STORESCORE_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn request_timeout_zero_is_rejected() {
    let mut map = full_env();
    map.insert("STORESCORE_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_REQUEST_TIMEOUT_SECS"
    ));
}

#[test]
fn max_retries_invalid() {
    let mut map = full_env();
    map.insert("STORESCORE_MAX_RETRIES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STORESCORE_MAX_RETRIES"),
        "expected InvalidEnvVar(STORESCORE_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("STORESCORE_API_TOKEN", "super-secret-token");
    map.insert("STORESCORE_MAPS_API_KEY", "maps-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("super-secret-token"));
    assert!(!debug.contains("maps-secret"));
    assert!(debug.contains("[redacted]"));
}
