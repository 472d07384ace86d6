use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

pub fn get_token_safety_margin_seconds(safety_margin_seconds_settings: Option<u64>) -> u64 {
    safety_margin_seconds_settings.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS)
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Expiry timestamp for a token that lives `expires_in_seconds` from now.
/// `None` when the result is outside the representable date range.
pub fn expires_at_from_now(expires_in_seconds: u64) -> Option<DateTime<Utc>> {
    let lifetime = TimeDelta::try_seconds(i64::try_from(expires_in_seconds).ok()?)?;
    now().checked_add_signed(lifetime)
}

pub fn get_instant() -> Instant {
    Instant::now()
}
