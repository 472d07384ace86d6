use std::sync::Arc;

use http::header::ACCEPT;
use http::StatusCode;
use reqwest::Response;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::token_manager::TokenManager;
use crate::config::settings::{EbayConfig, PricingConfig};
use crate::error::{ApiError, AuthError, Error, NetworkError, ParsingError, Result};
use crate::helpers::time::get_instant;
use crate::models::listing::ListingData;
use crate::observability::metrics::get_metrics;
use crate::parser::item_url::extract_item_id;
use crate::parser::listing_parser::parse_listing;
use crate::resilience::retry::{AttemptBudget, RetryingHttpClient};
use crate::sinks::credential_store::CredentialStore;
use crate::utils::constants::{ITEM_FIELD_GROUPS, MARKETPLACE_HEADER};

static ENDPOINT_LABEL: &str = "browse_get_item";

/// Browse API client: listing URL in, [`ListingData`] out.
pub struct ListingClient<S: CredentialStore> {
    tokens: Arc<TokenManager<S>>,
    http: RetryingHttpClient,
    browse_api_url: String,
    marketplace_id: String,
    pricing: PricingConfig,
}

impl<S: CredentialStore> ListingClient<S> {
    pub fn new(tokens: Arc<TokenManager<S>>, http: RetryingHttpClient, ebay: &EbayConfig, pricing: PricingConfig) -> Self {
        Self {
            tokens,
            http,
            browse_api_url: ebay.browse_api_url.trim_end_matches('/').to_owned(),
            marketplace_id: ebay.marketplace_id.to_owned(),
            pricing,
        }
    }

    pub async fn fetch_listing_data(&self, url: &str) -> Result<ListingData> {
        let started = get_instant();
        let result = self.fetch_and_parse(url).await;

        let metrics = get_metrics().await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics
            .listing_fetch_duration
            .with_label_values(&[outcome])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(listing) => info!(
                item_id = %listing.item_id,
                price = listing.price(),
                "listing fetched in {:?}",
                started.elapsed()
            ),
            Err(e) => {
                metrics.listing_fetch_failures.with_label_values(&[failure_reason(e)]).inc();
                warn!("listing fetch for '{url}' failed: {e}");
            }
        }
        result
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<ListingData> {
        let item_id = extract_item_id(url)?;
        let payload = self.fetch_item_payload(&item_id).await?;
        match parse_listing(&payload, &self.pricing) {
            Ok(listing) => Ok(listing),
            Err(e) => {
                get_metrics().await.parse_failures.inc();
                Err(e.into())
            }
        }
    }

    /// Raw item document for a legacy item id.
    ///
    /// A 401 forces one token refresh and one replay, both inside the attempt
    /// budget of this call.
    pub async fn fetch_item_payload(&self, item_id: &str) -> Result<Value> {
        self.tokens.ensure_valid().await?;
        let mut budget = self.http.budget();

        let response = self.get_item(item_id, &mut budget).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return read_payload(item_id, response).await;
        }

        warn!("access token refused for item {item_id}; forcing a refresh");
        if budget.remaining() == 0 {
            return Err(AuthError::TokenRejected.into());
        }
        self.tokens.force_refresh().await?;

        let response = self.get_item(item_id, &mut budget).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::TokenRejected.into());
        }
        read_payload(item_id, response).await
    }

    async fn get_item(&self, item_id: &str, budget: &mut AttemptBudget) -> Result<Response> {
        let token = self.tokens.current_token().await?;
        let url = format!("{}/item/get_item_by_legacy_id", self.browse_api_url);
        debug!("GET {url} legacy_item_id={item_id}");

        self.http
            .call_within(ENDPOINT_LABEL, budget, |client| {
                client
                    .get(&url)
                    .query(&[("legacy_item_id", item_id), ("fieldgroups", ITEM_FIELD_GROUPS)])
                    .bearer_auth(&token.access_token)
                    .header(MARKETPLACE_HEADER, &self.marketplace_id)
                    .header(ACCEPT, "application/json")
            })
            .await
    }
}

async fn read_payload(item_id: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::from(NetworkError::ConnectionFailed(e.to_string())))?;

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::ListingNotFound(item_id.to_owned()).into());
    }
    if !status.is_success() {
        return Err(ApiError::Rejected { status, body }.into());
    }
    serde_json::from_str(&body)
        .map_err(|e| ParsingError::MalformedPayload(format!("item {}: {}", item_id, e)).into())
}

fn failure_reason(err: &Error) -> &'static str {
    match err {
        Error::Auth(_) => "auth",
        Error::Network(_) => "network",
        Error::Api(ApiError::ListingNotFound(_)) => "not_found",
        Error::Api(_) => "api",
        Error::Parsing(ParsingError::InvalidUrl(_)) => "invalid_url",
        Error::Parsing(_) => "parse",
        Error::Credentials(_) => "credentials",
    }
}
