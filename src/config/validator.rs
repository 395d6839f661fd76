//! Configuration validation with aggregated errors.
//! Every issue is collected so a broken config is reported in one pass.

use reqwest::Url;
use tracing::{error, info};

use crate::config::providers::{FoodConfig, SpotifyConfig, TmdbConfig};
use crate::config::settings::SettingsConfig;
use crate::config::ServiceConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_RECOMMENDATION_LIMIT: u32 = 100;

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_tmdb(&cfg.providers.tmdb, &mut errors);
    validate_spotify(&cfg.providers.spotify, &mut errors);
    validate_food(&cfg.providers.food, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be a number in 0..=65535",
            settings.server.port
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if settings.cors.allowed_origins.is_empty() {
        errors.push("settings.cors.allowed_origins must not be empty; use '*' to allow any origin".to_string());
    }
}

/// PROVIDERS VALIDATION
fn validate_tmdb(tmdb: &TmdbConfig, errors: &mut Vec<String>) {
    validate_url("providers.tmdb.base_url", &tmdb.base_url, errors);
    if tmdb.api_key.trim().is_empty() {
        errors.push("providers.tmdb.api_key must not be empty".to_string());
    }
    validate_timeout("providers.tmdb.timeout_ms", tmdb.timeout_ms, errors);
}

fn validate_spotify(spotify: &SpotifyConfig, errors: &mut Vec<String>) {
    validate_url("providers.spotify.token_url", &spotify.token_url, errors);
    validate_url("providers.spotify.api_base_url", &spotify.api_base_url, errors);
    if spotify.client_id.trim().is_empty() {
        errors.push("providers.spotify.client_id must not be empty".to_string());
    }
    if spotify.client_secret.trim().is_empty() {
        errors.push("providers.spotify.client_secret must not be empty".to_string());
    }
    validate_timeout("providers.spotify.timeout_ms", spotify.timeout_ms, errors);

    if let Some(s) = spotify.safety_margin_seconds {
        if s > 60 * 60 * 24 {
            errors.push(format!(
                "providers.spotify.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if spotify.recommendation_limit == 0 || spotify.recommendation_limit > MAX_RECOMMENDATION_LIMIT {
        errors.push(format!(
            "providers.spotify.recommendation_limit ({}) must be in 1..={}",
            spotify.recommendation_limit, MAX_RECOMMENDATION_LIMIT
        ));
    }
}

fn validate_food(food: &FoodConfig, errors: &mut Vec<String>) {
    if food.path.trim().is_empty() {
        errors.push("providers.food.path must not be empty".to_string());
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("{} '{}' has unsupported scheme '{}'", field, value, url.scheme())),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}", field, value, e)),
    }
}

fn validate_timeout(field: &str, timeout_ms: u64, errors: &mut Vec<String>) {
    if timeout_ms == 0 {
        errors.push(format!("{} must be greater than 0", field));
    }
}
