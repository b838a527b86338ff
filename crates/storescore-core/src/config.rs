use crate::app_config::{AppConfig, Environment};
use crate::ids::OrgId;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let api_url = require("STORESCORE_API_URL")?;
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "STORESCORE_API_URL".to_string(),
            reason: format!("'{api_url}' must start with http:// or https://"),
        });
    }

    let org_id = parse_org_id(&require("STORESCORE_ORG_ID")?)?;
    let api_token = optional("STORESCORE_API_TOKEN");
    let env = parse_environment(&or_default("STORESCORE_ENV", "development"))?;
    let log_level = or_default("STORESCORE_LOG_LEVEL", "info");
    let maps_api_key = optional("STORESCORE_MAPS_API_KEY");

    let request_timeout_secs = parse_u64("STORESCORE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STORESCORE_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("STORESCORE_USER_AGENT", "storescore/0.1 (region-manager)");
    let max_retries = parse_u32("STORESCORE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("STORESCORE_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        api_url,
        org_id,
        api_token,
        env,
        log_level,
        maps_api_key,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

fn parse_org_id(raw: &str) -> Result<OrgId, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "STORESCORE_ORG_ID".to_string(),
        reason,
    };
    let id = raw
        .parse::<OrgId>()
        .map_err(|e| invalid(e.to_string()))?;
    if id.get() <= 0 {
        return Err(invalid(format!("'{raw}' must be a positive integer")));
    }
    Ok(id)
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STORESCORE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
