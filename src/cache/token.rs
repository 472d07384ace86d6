use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::helpers::time::now;

pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// OAuth2 token fields as persisted by the credential store.
///
/// `expires_at` is the only freshness signal; nothing else is consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl TokenState {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
            token_type: DEFAULT_TOKEN_TYPE.to_owned(),
        }
    }

    /// Moment from which the token must be refreshed before use.
    pub fn refresh_at(&self, safety_margin_seconds: u64) -> DateTime<Utc> {
        i64::try_from(safety_margin_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|margin| self.expires_at.checked_sub_signed(margin))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// True inside the safety margin before `expires_at`, not only after it.
    pub fn is_expiring(&self, safety_margin_seconds: u64) -> bool {
        now() >= self.refresh_at(safety_margin_seconds)
    }

    pub fn is_expired(&self) -> bool {
        now() >= self.expires_at
    }
}
