use crate::app_config::{AppConfig, Environment, OverlapPolicy};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Read `.env` (if present) and then build [`AppConfig`] from the process
/// environment.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Build [`AppConfig`] from the current process environment only.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Every variable is optional. `lookup` stands in for `std::env::var`.
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = or_default("DATABASE_URL", "sqlite://accounts.db?mode=rwc");
    let env = parse_environment(&or_default("INFLUDB_ENV", "development"));
    let log_level = or_default("INFLUDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("INFLUDB_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("INFLUDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("INFLUDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let max_concurrent_extractions = parse_usize("INFLUDB_MAX_CONCURRENT_EXTRACTIONS", "5")?;
    let schedule_interval_mins = parse_u64("INFLUDB_SCHEDULE_INTERVAL_MINS", "60")?;
    if schedule_interval_mins == 0 {
        return Err(invalid(
            "INFLUDB_SCHEDULE_INTERVAL_MINS",
            "interval must be at least 1 minute".to_string(),
        ));
    }
    let overlap_raw = or_default("INFLUDB_SCHEDULE_OVERLAP", "skip");
    let schedule_overlap = parse_overlap_policy(&overlap_raw).ok_or_else(|| {
        invalid(
            "INFLUDB_SCHEDULE_OVERLAP",
            format!("expected \"skip\" or \"allow\", got \"{overlap_raw}\""),
        )
    })?;

    let scraper_request_timeout_secs = parse_u64("INFLUDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("INFLUDB_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let instagram_cooldown_mins = parse_u64("INFLUDB_INSTAGRAM_COOLDOWN_MINS", "30")?;

    let browserless_url = or_default("INFLUDB_BROWSERLESS_URL", "http://localhost:3000");
    let browserless_token = lookup("INFLUDB_BROWSERLESS_TOKEN")
        .ok()
        .filter(|t| !t.is_empty());
    let screenshot_dir = PathBuf::from(or_default("INFLUDB_SCREENSHOT_DIR", "./diagnostics"));

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        max_concurrent_extractions: max_concurrent_extractions.max(1),
        schedule_interval_mins,
        schedule_overlap,
        scraper_request_timeout_secs,
        scraper_user_agent,
        instagram_cooldown_mins,
        browserless_url,
        browserless_token,
        screenshot_dir,
    })
}

/// Anything other than `production` or `test` is development.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_overlap_policy(s: &str) -> Option<OverlapPolicy> {
    match s.trim().to_lowercase().as_str() {
        "skip" => Some(OverlapPolicy::Skip),
        "allow" => Some(OverlapPolicy::Allow),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
