//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates retry / timeout / safety margin bounds, endpoint urls,
//!   application credentials, pricing rates and logging level

use tracing::{error, info};
use url::Url;

use crate::config::settings::{EbayConfig, PricingConfig, RetryConfig, ServiceConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_ebay(&cfg.ebay, &mut errors);
    validate_pricing(&cfg.pricing, &mut errors);

    if cfg.credentials.path.trim().is_empty() {
        errors.push("credentials.path must not be empty".to_string());
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc_by(errors.len() as u64);
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    // safety margin sane bounds
    if let Some(s) = settings.safety_margin_seconds {
        if s > 60 * 60 * 24 {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) is unreasonably large",
                s
            ));
        }
    }

    if settings.request_timeout_ms == Some(0) {
        errors.push("settings.request_timeout_ms must be > 0".to_string());
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_retry(ctx: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push(format!("{}.attempts must be >= 1", ctx));
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if base > max {
            errors.push(format!(
                "{}.base_delay_ms ({}) must be <= max_delay_ms ({})",
                ctx, base, max
            ));
        }
    }
    if let Some(jitter) = retry.jitter_factor {
        if !(0.0..=1.0).contains(&jitter) {
            errors.push(format!("{}.jitter_factor ({}) must be within 0.0..=1.0", ctx, jitter));
        }
    }
}

fn validate_ebay(ebay: &EbayConfig, errors: &mut Vec<String>) {
    if ebay.app_id.is_empty() {
        errors.push("ebay.app_id is not set (config or credential file EBAY_APP_ID)".to_string());
    }
    if ebay.client_secret.is_empty() {
        errors.push("ebay.client_secret is not set (config or credential file EBAY_CLIENT_SECRET)".to_string());
    }
    validate_http_url("ebay.token_url", &ebay.token_url, errors);
    validate_http_url("ebay.browse_api_url", &ebay.browse_api_url, errors);
    if ebay.marketplace_id.is_empty() {
        errors.push("ebay.marketplace_id must not be empty".to_string());
    }
}

fn validate_http_url(ctx: &str, raw: &str, errors: &mut Vec<String>) {
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!("{} '{}' has unsupported scheme '{}'", ctx, raw, url.scheme())),
        Err(e) => errors.push(format!("{} '{}' is not a valid url: {}", ctx, raw, e)),
    }
}

fn validate_pricing(pricing: &PricingConfig, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&pricing.sales_tax_rate) {
        errors.push(format!(
            "pricing.sales_tax_rate ({}) must be within 0.0..=1.0",
            pricing.sales_tax_rate
        ));
    }
    if !(0.0..=1.0).contains(&pricing.import_charge_rate) {
        errors.push(format!(
            "pricing.import_charge_rate ({}) must be within 0.0..=1.0",
            pricing.import_charge_rate
        ));
    }
    let country = &pricing.home_country;
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
        errors.push(format!(
            "pricing.home_country '{}' must be a 2-letter uppercase country code",
            country
        ));
    }
}
