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
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.database_url, "sqlite://accounts.db?mode=rwc");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.max_concurrent_extractions, 5);
    assert_eq!(cfg.schedule_interval_mins, 60);
    assert_eq!(cfg.schedule_overlap, OverlapPolicy::Skip);
    assert_eq!(cfg.scraper_request_timeout_secs, 30);
    assert_eq!(cfg.instagram_cooldown_mins, 30);
    assert_eq!(cfg.browserless_url, "http://localhost:3000");
    assert!(cfg.browserless_token.is_none());
    assert_eq!(cfg.screenshot_dir.to_str(), Some("./diagnostics"));
}

#[test]
fn max_concurrent_extractions_override() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_MAX_CONCURRENT_EXTRACTIONS", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_extractions, 8);
}

#[test]
fn max_concurrent_extractions_zero_is_clamped_to_one() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_MAX_CONCURRENT_EXTRACTIONS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_extractions, 1);
}

#[test]
fn max_concurrent_extractions_invalid() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_MAX_CONCURRENT_EXTRACTIONS", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INFLUDB_MAX_CONCURRENT_EXTRACTIONS"),
        "expected InvalidEnvVar(INFLUDB_MAX_CONCURRENT_EXTRACTIONS), got: {result:?}"
    );
}

#[test]
fn schedule_interval_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_SCHEDULE_INTERVAL_MINS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INFLUDB_SCHEDULE_INTERVAL_MINS"),
        "expected InvalidEnvVar(INFLUDB_SCHEDULE_INTERVAL_MINS), got: {result:?}"
    );
}

#[test]
fn schedule_overlap_allow() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_SCHEDULE_OVERLAP", "Allow");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.schedule_overlap, OverlapPolicy::Allow);
}

#[test]
fn schedule_overlap_unknown_is_rejected() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_SCHEDULE_OVERLAP", "queue");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "INFLUDB_SCHEDULE_OVERLAP"),
        "expected InvalidEnvVar(INFLUDB_SCHEDULE_OVERLAP), got: {result:?}"
    );
}

#[test]
fn instagram_cooldown_override() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_INSTAGRAM_COOLDOWN_MINS", "45");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.instagram_cooldown_mins, 45);
}

#[test]
fn empty_browserless_token_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_BROWSERLESS_TOKEN", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.browserless_token.is_none());
}

#[test]
fn debug_output_redacts_browserless_token() {
    let mut map = HashMap::new();
    map.insert("INFLUDB_BROWSERLESS_TOKEN", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
