use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every key has a default, so an empty environment yields a usable config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let env = parse_environment(&or_default("XMALL_ENV", "development"))?;
    let log_level = or_default("XMALL_LOG_LEVEL", "info");

    let cache_dir = PathBuf::from(or_default("XMALL_CACHE_DIR", "./data/cache"));
    let cache_enabled = parse_bool("XMALL_CACHE_ENABLED", "true")?;
    let cache_max_age_days = parse_i64("XMALL_CACHE_MAX_AGE_DAYS", "7")?;

    let scraper_request_timeout_secs = parse_u64("XMALL_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("XMALL_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let vvic_api_base_url = or_default("XMALL_VVIC_API_BASE_URL", "https://www.vvic.com");

    let openai_api_key = lookup("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let translate_base_url = or_default("XMALL_TRANSLATE_BASE_URL", "https://api.openai.com/v1");
    let translate_model = or_default("XMALL_TRANSLATE_MODEL", "gpt-3.5-turbo");
    let translate_target_lang = or_default("XMALL_TRANSLATE_TARGET_LANG", "Korean");

    let session_ttl_secs = parse_u64("XMALL_SESSION_TTL_SECS", "3600")?;

    Ok(AppConfig {
        env,
        log_level,
        cache_dir,
        cache_enabled,
        cache_max_age_days,
        scraper_request_timeout_secs,
        scraper_user_agent,
        vvic_api_base_url,
        openai_api_key,
        translate_base_url,
        translate_model,
        translate_target_lang,
        session_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "XMALL_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
