use std::time::Duration;

use chrono::DateTime;
use http::header::RETRY_AFTER;
use http::{HeaderMap, StatusCode};
use rand::Rng;
use reqwest::{Client, RequestBuilder, Response};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::error::{ApiError, Error, NetworkError, Result};
use crate::helpers::time::now;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::*;

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub attempts: u32,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// random extra fraction of the delay, in [0, jitter_factor]
    pub jitter_factor: f64,
    /// upper bound for a server supplied Retry-After
    pub max_retry_after_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_RETRY_MAX_DELAY_MS,
            jitter_factor: DEFAULT_RETRY_JITTER_FACTOR,
            max_retry_after_ms: DEFAULT_MAX_RETRY_AFTER_MS,
        }
    }
}

impl RetrySettings {
    /// Exponential delay before the attempt following `attempt` (1-based), with jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent).min(self.max_delay_ms);
        let jitter = if self.jitter_factor > 0.0 {
            rand::rng().random_range(0.0..=self.jitter_factor)
        } else {
            0.0
        };
        let delay = ((delay as f64) * (1.0 + jitter)) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Backoff delay, raised to the server's Retry-After hint when there is one.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff_delay(attempt);
        match retry_after {
            Some(hint) => backoff.max(hint.min(Duration::from_millis(self.max_retry_after_ms))),
            None => backoff,
        }
    }

    pub fn budget(&self) -> AttemptBudget {
        AttemptBudget::new(self.attempts)
    }
}

/// Attempts left for one logical call. Sub-requests of the same call share it.
#[derive(Debug, Clone)]
pub struct AttemptBudget {
    total: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(total: u32) -> Self {
        Self { total, used: 0 }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }

    /// Claim the next attempt, returning its 1-based number.
    fn take(&mut self) -> Option<u32> {
        if self.remaining() == 0 {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }
}

/// reqwest client wrapper that retries connection failures, timeouts, 429 and 5xx.
///
/// Any other response, including 4xx, is handed back to the caller untouched so it
/// can map the status to its own permanent error.
#[derive(Debug, Clone)]
pub struct RetryingHttpClient {
    client: Client,
    settings: RetrySettings,
}

impl RetryingHttpClient {
    pub fn new(settings: RetrySettings, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn budget(&self) -> AttemptBudget {
        self.settings.budget()
    }

    /// One logical call with a fresh attempt budget.
    pub async fn call<F>(&self, endpoint: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut budget = self.budget();
        self.call_within(endpoint, &mut budget, build).await
    }

    /// Like [`call`](Self::call) but drawing attempts from a caller owned budget.
    pub async fn call_within<F>(&self, endpoint: &str, budget: &mut AttemptBudget, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let metrics = get_metrics().await;
        let mut last: Option<Error> = None;

        while let Some(attempt) = budget.take() {
            debug!("{endpoint}: attempt {attempt}/{}", self.settings.attempts);
            let (err, retry_after) = match build(&self.client).send().await {
                Ok(response) => match classify_status(response.status(), response.headers()) {
                    None => {
                        metrics.http_attempts.with_label_values(&[endpoint, "ok"]).inc();
                        return Ok(response);
                    }
                    Some(retryable) => retryable,
                },
                Err(e) => (classify_transport_error(&e), None),
            };
            metrics.http_attempts.with_label_values(&[endpoint, outcome_label(&err)]).inc();

            if budget.remaining() > 0 {
                let delay = self.settings.delay_for(attempt, retry_after);
                warn!("{endpoint}: attempt {attempt}/{} failed: {err}; retrying in {delay:?}", self.settings.attempts);
                sleep(delay).await;
            }
            last = Some(err);
        }

        metrics.http_retries_exhausted.with_label_values(&[endpoint]).inc();
        let last = last.unwrap_or_else(|| {
            NetworkError::ConnectionFailed("attempt budget already spent".to_owned()).into()
        });
        error!("{endpoint}: all {} attempts failed: {last}", budget.used());
        Err(NetworkError::RetriesExhausted {
            attempts: budget.used(),
            last: Box::new(last),
        }
        .into())
    }
}

/// `None` for responses handed back to the caller, otherwise the retryable error.
fn classify_status(status: StatusCode, headers: &HeaderMap) -> Option<(Error, Option<Duration>)> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(headers);
        let err = ApiError::RateLimited {
            retry_after_secs: retry_after.map(|d| d.as_secs()),
        };
        Some((err.into(), retry_after))
    } else if status.is_server_error() {
        Some((ApiError::ServerError(status).into(), None))
    } else {
        None
    }
}

fn classify_transport_error(err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        NetworkError::Timeout(err.to_string()).into()
    } else {
        NetworkError::ConnectionFailed(err.to_string()).into()
    }
}

fn outcome_label(err: &Error) -> &'static str {
    match err {
        Error::Api(ApiError::RateLimited { .. }) => "rate_limited",
        Error::Api(ApiError::ServerError(_)) => "server_error",
        Error::Network(NetworkError::Timeout(_)) => "timeout",
        _ => "connection",
    }
}

/// Retry-After as delta-seconds or an HTTP date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(raw).ok()?;
    let wait = at.timestamp() - now().timestamp();
    Some(Duration::from_secs(wait.max(0) as u64))
}
