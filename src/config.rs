//! Configuration loader — merges env vars, .env file, and config.toml.

use std::path::Path;

use chrono_tz::Tz;
use common::config::AppConfig;
use common::Error;

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.leagues.is_empty() {
        issues.push("leagues must contain at least one league".into());
    }
    if !config.leagues.contains_key(&config.league) {
        issues.push(format!(
            "league {:?} is not in the leagues table (known: {})",
            config.league,
            config
                .leagues
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    if config.timezone.parse::<Tz>().is_err() {
        issues.push(format!("timezone {:?} is not a valid IANA name", config.timezone));
    }
    if config.endpoints.feed_url.trim().is_empty() {
        issues.push("endpoints.feed_url must not be empty".into());
    }
    if config.endpoints.poll_ids_url.trim().is_empty() {
        issues.push("endpoints.poll_ids_url must not be empty".into());
    }
    if config.endpoints.poll_proxy_url.trim().is_empty() {
        issues.push("endpoints.poll_proxy_url must not be empty".into());
    }
    if config.timing.feed_timeout_secs == 0 {
        issues.push("timing.feed_timeout_secs must be > 0".into());
    }
    if config.timing.poll_timeout_secs == 0 {
        issues.push("timing.poll_timeout_secs must be > 0".into());
    }
    if config.timing.token_timeout_secs == 0 {
        issues.push("timing.token_timeout_secs must be > 0".into());
    }
    if config.snapshot_path.trim().is_empty() {
        issues.push("snapshot_path must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file if present.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(league) = std::env::var("DOTD_LEAGUE") {
        config.league = league.trim().to_ascii_lowercase();
    }
    if let Ok(timezone) = std::env::var("DOTD_TIMEZONE") {
        config.timezone = timezone.trim().to_string();
    }
    if let Ok(path) = std::env::var("DOTD_SNAPSHOT_PATH") {
        config.snapshot_path = path;
    }
    if let Ok(url) = std::env::var("UNABATED_FEED_URL") {
        config.endpoints.feed_url = url;
    }
    if let Ok(url) = std::env::var("DOTD_POLL_IDS_URL") {
        config.endpoints.poll_ids_url = url;
    }
    if let Ok(url) = std::env::var("DOTD_POLL_PROXY_URL") {
        config.endpoints.poll_proxy_url = url;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
