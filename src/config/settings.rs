use std::time::Duration;

use serde::Deserialize;

use crate::resilience::retry::RetrySettings;
use crate::utils::constants::*;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub ebay: EbayConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub safety_margin_seconds: Option<u64>,
    /// per attempt timeout
    pub request_timeout_ms: Option<u64>,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

impl SettingsConfig {
    pub fn retry_settings(&self) -> RetrySettings {
        let retry = self.retry.as_ref();
        RetrySettings {
            attempts: retry.and_then(|r| r.attempts).unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            base_delay_ms: retry.and_then(|r| r.base_delay_ms).unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            max_delay_ms: retry.and_then(|r| r.max_delay_ms).unwrap_or(DEFAULT_RETRY_MAX_DELAY_MS),
            jitter_factor: retry.and_then(|r| r.jitter_factor).unwrap_or(DEFAULT_RETRY_JITTER_FACTOR),
            max_retry_after_ms: retry.and_then(|r| r.max_retry_after_ms).unwrap_or(DEFAULT_MAX_RETRY_AFTER_MS),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// attempts per logical call, including the first one
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
    /// invariant: 0.0 ..= 1.0
    pub jitter_factor: Option<f64>,
    pub max_retry_after_ms: Option<u64>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// ================================
/// eBay application and endpoints
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EbayConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_browse_api_url")]
    pub browse_api_url: String,
    #[serde(default = "default_marketplace_id")]
    pub marketplace_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for EbayConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
            browse_api_url: default_browse_api_url(),
            marketplace_id: default_marketplace_id(),
            scopes: default_scopes(),
        }
    }
}

impl EbayConfig {
    pub fn app_credentials(&self) -> AppCredentials {
        AppCredentials {
            app_id: self.app_id.to_owned(),
            client_secret: self.client_secret.to_owned(),
        }
    }
}

/// OAuth2 client id / secret pair used for the refresh grant.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub client_secret: String,
}

impl AppCredentials {
    pub fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// ================================
/// Pricing
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default)]
    pub sales_tax_rate: f64,
    /// ISO country code of the buyer
    #[serde(default = "default_home_country")]
    pub home_country: String,
    /// flat estimate applied to cross-border items with no explicit import charge;
    /// an approximation, tune per market
    #[serde(default = "default_import_charge_rate")]
    pub import_charge_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            sales_tax_rate: 0.0,
            home_country: default_home_country(),
            import_charge_rate: default_import_charge_rate(),
        }
    }
}

/// ================================
/// Credential file
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default = "default_credentials_path")]
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self { path: default_credentials_path() }
    }
}

fn default_token_url() -> String {
    EBAY_TOKEN_URL.to_string()
}

fn default_browse_api_url() -> String {
    EBAY_BROWSE_API_URL.to_string()
}

fn default_marketplace_id() -> String {
    EBAY_MARKETPLACE_ID.to_string()
}

fn default_scopes() -> Vec<String> {
    EBAY_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_home_country() -> String {
    DEFAULT_HOME_COUNTRY.to_string()
}

fn default_import_charge_rate() -> f64 {
    DEFAULT_IMPORT_CHARGE_RATE
}

fn default_credentials_path() -> String {
    DEFAULT_CREDENTIALS_PATH.to_string()
}
