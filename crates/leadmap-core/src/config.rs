use crate::app_config::AppConfig;
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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
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

    let api_key = require("GOOGLE_MAPS_API_KEY")?;

    let city = or_default("LEADMAP_CITY", "Huancayo");
    let country = or_default("LEADMAP_COUNTRY", "PE");
    let region = or_default("LEADMAP_REGION", "pe");
    let language = or_default("LEADMAP_LANGUAGE", "es");
    let log_level = or_default("LEADMAP_LOG_LEVEL", "info");
    let sectors_path = PathBuf::from(or_default("LEADMAP_SECTORS_PATH", "./config/sectors.yaml"));
    let output_dir = PathBuf::from(or_default("LEADMAP_OUTPUT_DIR", "./frontend/src/data"));

    let max_pages_per_query = parse_u32("LEADMAP_MAX_PAGES_PER_QUERY", "3")?;
    if max_pages_per_query == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADMAP_MAX_PAGES_PER_QUERY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let page_token_delay_ms = parse_u64("LEADMAP_PAGE_TOKEN_DELAY_MS", "2000")?;
    let detail_delay_ms = parse_u64("LEADMAP_DETAIL_DELAY_MS", "200")?;
    let query_delay_ms = parse_u64("LEADMAP_QUERY_DELAY_MS", "1000")?;
    let request_timeout_secs = parse_u64("LEADMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("LEADMAP_USER_AGENT", "leadmap/0.1 (lead-collection)");

    Ok(AppConfig {
        api_key,
        city,
        country,
        region,
        language,
        log_level,
        sectors_path,
        output_dir,
        max_pages_per_query,
        page_token_delay_ms,
        detail_delay_ms,
        query_delay_ms,
        request_timeout_secs,
        user_agent,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
