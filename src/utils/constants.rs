//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_RETRY_JITTER_FACTOR: f64 = 0.1;
pub const DEFAULT_MAX_RETRY_AFTER_MS: u64 = 60_000;

pub const EBAY_TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
pub const EBAY_BROWSE_API_URL: &str = "https://api.ebay.com/buy/browse/v1";
pub const EBAY_MARKETPLACE_ID: &str = "EBAY_US";
pub const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";
pub const ITEM_FIELD_GROUPS: &str = "PRODUCT,ADDITIONAL_SELLER_DETAILS";

pub const EBAY_SCOPES: [&str; 5] = [
    "https://api.ebay.com/oauth/api_scope",
    "https://api.ebay.com/oauth/api_scope/buy.order",
    "https://api.ebay.com/oauth/api_scope/sell.marketing.readonly",
    "https://api.ebay.com/oauth/api_scope/sell.inventory.readonly",
    "https://api.ebay.com/oauth/api_scope/sell.account.readonly",
];

pub const DEFAULT_HOME_COUNTRY: &str = "US";
/// Flat import-charge estimate for cross-border items without an explicit figure.
/// This is an approximation, not a customs calculation.
pub const DEFAULT_IMPORT_CHARGE_RATE: f64 = 0.10;
pub const MAX_LISTING_IMAGES: usize = 24;

pub const DEFAULT_CREDENTIALS_PATH: &str = ".env";

// credential file keys
pub const KEY_ACCESS_TOKEN: &str = "EBAY_USER_TOKEN";
pub const KEY_REFRESH_TOKEN: &str = "EBAY_REFRESH_TOKEN";
pub const KEY_EXPIRES_AT: &str = "EBAY_TOKEN_EXPIRES_AT";
pub const KEY_TOKEN_TYPE: &str = "EBAY_TOKEN_TYPE";
pub const KEY_APP_ID: &str = "EBAY_APP_ID";
pub const KEY_CLIENT_SECRET: &str = "EBAY_CLIENT_SECRET";
