//! Configuration loader: merges defaults, config.toml, .env and env vars.

use common::config::AppConfig;
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn is_http_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

pub fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.region.name.trim().is_empty() {
        issues.push("region.name must not be empty".into());
    }
    if config.region.country_code.trim().is_empty() {
        issues.push("region.country_code must not be empty".into());
    }
    let b = &config.region.bounds;
    if !(b.xmin < b.xmax && b.ymin < b.ymax) {
        issues.push("region.bounds must satisfy xmin < xmax and ymin < ymax".into());
    }
    if b.xmin < -180.0 || b.xmax > 180.0 || b.ymin < -90.0 || b.ymax > 90.0 {
        issues.push("region.bounds must lie within [-180,180] x [-90,90]".into());
    }

    if !is_http_url(&config.geocoder.url) {
        issues.push("geocoder.url must be an http(s) URL".into());
    }
    if config.geocoder.max_candidates == 0 {
        issues.push("geocoder.max_candidates must be > 0".into());
    }

    // An empty fires_url is allowed: the fetcher serves sample data.
    if !config.wildfire.fires_url.is_empty() && !is_http_url(&config.wildfire.fires_url) {
        issues.push("wildfire.fires_url must be an http(s) URL".into());
    }
    if config.wildfire.hotspots_enabled && !is_http_url(&config.wildfire.hotspots_url) {
        issues.push("wildfire.hotspots_url must be an http(s) URL when hotspots are enabled".into());
    }
    if config.wildfire.timeout_secs == 0 {
        issues.push("wildfire.timeout_secs must be > 0".into());
    }

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.cache.invalidation_interval_secs == 0 {
        issues.push("cache.invalidation_interval_secs must be > 0".into());
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

/// Load configuration from an optional config file and the environment.
pub fn load_config(config_path: &Path) -> Result<AppConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Layer the config file on top if it exists.
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    }

    // 4. Environment variables win.
    if let Ok(url) = std::env::var("WILDFIRE_FIRES_URL") {
        config.wildfire.fires_url = url.trim().to_string();
    }
    if let Ok(url) = std::env::var("WILDFIRE_HOTSPOTS_URL") {
        config.wildfire.hotspots_url = url.trim().to_string();
    }
    if let Ok(url) = std::env::var("WILDFIRE_GEOCODER_URL") {
        config.geocoder.url = url.trim().to_string();
    }
    if let Ok(region) = std::env::var("WILDFIRE_REGION") {
        config.region.name = region.trim().to_string();
    }
    if let Ok(raw) = std::env::var("WILDFIRE_HTTP_TIMEOUT_SECS") {
        config.wildfire.timeout_secs = parse_positive_u64(&raw, "WILDFIRE_HTTP_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("WILDFIRE_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "WILDFIRE_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("WILDFIRE_CACHE_INVALIDATE_SECS") {
        config.cache.invalidation_interval_secs =
            parse_positive_u64(&raw, "WILDFIRE_CACHE_INVALIDATE_SECS")?;
    }
    if let Ok(raw) = std::env::var("WILDFIRE_HOTSPOTS_ENABLED") {
        config.wildfire.hotspots_enabled = parse_bool(&raw);
    }

    validate_config(&config)?;

    Ok(config)
}
