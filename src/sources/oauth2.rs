use http::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::token::TokenState;
use crate::config::settings::{AppCredentials, EbayConfig};
use crate::error::{ApiError, AuthError, Error, NetworkError, ParsingError, Result};
use crate::helpers::time::expires_at_from_now;
use crate::resilience::retry::RetryingHttpClient;

static ENDPOINT_LABEL: &str = "oauth2_refresh";

/// Token endpoint response for `grant_type=refresh_token`.
#[derive(Debug, Deserialize)]
struct RefreshGrantResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Refresh-grant client for the authorization server.
#[derive(Debug, Clone)]
pub struct OAuth2RefreshSource {
    token_url: String,
    credentials: AppCredentials,
    scope: String,
    http: RetryingHttpClient,
}

impl OAuth2RefreshSource {
    pub fn new(ebay: &EbayConfig, credentials: AppCredentials, http: RetryingHttpClient) -> Self {
        Self {
            token_url: ebay.token_url.to_owned(),
            credentials,
            scope: ebay.scopes.join(" "),
            http,
        }
    }

    /// Exchange `current.refresh_token` for a new access token.
    ///
    /// 4xx is a permanent rejection. Transport failures, 429 and 5xx are retried
    /// and end as `RefreshUnavailable` once the budget is gone.
    pub async fn refresh(&self, current: &TokenState) -> Result<TokenState> {
        if !self.credentials.is_complete() || current.refresh_token.is_empty() {
            return Err(AuthError::NotInitialized.into());
        }

        debug!("POST {}", self.token_url);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let response = self
            .http
            .call(ENDPOINT_LABEL, |client| {
                client
                    .post(&self.token_url)
                    .basic_auth(&self.credentials.app_id, Some(&self.credentials.client_secret))
                    .header(ACCEPT, "application/json")
                    .form(&form)
            })
            .await
            .map_err(unavailable)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| unavailable(NetworkError::ConnectionFailed(e.to_string()).into()))?;

        if status.is_client_error() {
            warn!("refresh grant rejected: {}", status);
            return Err(AuthError::RefreshRejected { status, body }.into());
        }
        if !status.is_success() {
            return Err(unavailable(ApiError::Rejected { status, body }.into()));
        }

        let grant: RefreshGrantResponse = serde_json::from_str(&body)
            .map_err(|e| ParsingError::MalformedPayload(format!("refresh grant response: {}", e)))?;

        let expires_at = expires_at_from_now(grant.expires_in).ok_or_else(|| {
            ParsingError::MalformedPayload(format!("refresh grant expires_in out of range: {}", grant.expires_in))
        })?;

        Ok(TokenState {
            access_token: grant.access_token,
            // a rotated refresh token replaces the old one, otherwise keep it
            refresh_token: grant
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at,
            token_type: grant
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| current.token_type.clone()),
        })
    }
}

fn unavailable(err: Error) -> Error {
    match err {
        Error::Network(_) | Error::Api(_) => AuthError::RefreshUnavailable(Box::new(err)).into(),
        other => other,
    }
}
