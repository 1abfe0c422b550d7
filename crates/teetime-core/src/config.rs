use crate::app_config::AppConfig;
use crate::ConfigError;

const MAX_WINDOW_DAYS: u32 = 60;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a runnable
/// configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let bind_addr = parse_addr("TEETIME_BIND_ADDR", "0.0.0.0:10000")?;
    let log_level = or_default("TEETIME_LOG_LEVEL", "info");
    let clubs_path = PathBuf::from(or_default("TEETIME_CLUBS_PATH", "./static/golf_clubs.json"));
    let snapshot_path = Some(or_default(
        "TEETIME_SNAPSHOT_PATH",
        "./data/cache-snapshot.json",
    ))
    .filter(|p| !p.trim().is_empty())
    .map(PathBuf::from);

    let refresh_interval_secs = parse_u64("TEETIME_REFRESH_INTERVAL_SECS", "9000")?;
    let window_days = parse_u32("TEETIME_WINDOW_DAYS", "18")?;
    if window_days == 0 || window_days > MAX_WINDOW_DAYS {
        return Err(invalid(
            "TEETIME_WINDOW_DAYS",
            format!("must be between 1 and {MAX_WINDOW_DAYS}, got {window_days}"),
        ));
    }

    let user_agent = or_default("TEETIME_USER_AGENT", "Mozilla/5.0");
    let teescanner_base_url =
        or_default("TEETIME_SOURCE_A_BASE_URL", "https://foapi.teescanner.com");
    let teescanner_timeout_secs = parse_u64("TEETIME_SOURCE_A_TIMEOUT_SECS", "6")?;
    let golfpang_base_url = or_default("TEETIME_SOURCE_B_BASE_URL", "https://www.golfpang.com");
    let golfpang_accept_invalid_certs =
        parse_bool("TEETIME_SOURCE_B_ACCEPT_INVALID_CERTS", "false")?;

    let connect_timeout_secs = parse_u64("TEETIME_CONNECT_TIMEOUT_SECS", "5")?;
    let read_timeout_secs = parse_u64("TEETIME_READ_TIMEOUT_SECS", "8")?;
    let max_retries = parse_u32("TEETIME_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("TEETIME_RETRY_BACKOFF_BASE_MS", "500")?;

    let breaker_threshold = parse_u32("TEETIME_BREAKER_THRESHOLD", "3")?;
    if breaker_threshold == 0 {
        return Err(invalid(
            "TEETIME_BREAKER_THRESHOLD",
            "must be at least 1".to_string(),
        ));
    }
    let breaker_cooldown_secs = parse_u64("TEETIME_BREAKER_COOLDOWN_SECS", "300")?;
    let cache_lock_timeout_ms = parse_u64("TEETIME_CACHE_LOCK_TIMEOUT_MS", "250")?;
    let crawl_favorites = parse_list(&or_default("TEETIME_CRAWL_FAVORITES", ""));
    let max_query_days = parse_u32("TEETIME_MAX_QUERY_DAYS", "62")?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        clubs_path,
        snapshot_path,
        refresh_interval_secs,
        window_days,
        user_agent,
        teescanner_base_url,
        teescanner_timeout_secs,
        golfpang_base_url,
        golfpang_accept_invalid_certs,
        connect_timeout_secs,
        read_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        breaker_threshold,
        breaker_cooldown_secs,
        cache_lock_timeout_ms,
        crawl_favorites,
        max_query_days,
    })
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
